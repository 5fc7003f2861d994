//! Student record model.
//!
//! A [`User`] is the record-store view of a CS student: identity, enrolment
//! and the running count of answered questions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::CourseCode;

/// Maximum accepted length of a user identifier, in characters.
pub const USER_ID_MAX: usize = 128;

/// Characters the record store reserves in key paths.
pub(crate) const RESERVED_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Validation errors for [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    IdTooLong { max: usize },
    IdSurroundingWhitespace,
    IdReservedCharacter { character: char },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::IdTooLong { max } => write!(f, "user id must be at most {max} characters"),
            Self::IdSurroundingWhitespace => {
                write!(f, "user id must not start or end with whitespace")
            }
            Self::IdReservedCharacter { character } => {
                write!(f, "user id must not contain {character:?}")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Validation errors for [`AcademicYear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcademicYearError {
    Zero,
}

impl fmt::Display for AcademicYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "academic year must be at least 1"),
        }
    }
}

impl std::error::Error for AcademicYearError {}

/// Opaque student identifier, usable as a record-store key segment.
///
/// # Examples
/// ```
/// use cs_assistant::domain::UserId;
///
/// assert!(UserId::new("CS_STUDENT_1").is_ok());
/// assert!(UserId::new("users/evil").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        if id.trim() != id {
            return Err(UserValidationError::IdSurroundingWhitespace);
        }
        if let Some(character) = id
            .chars()
            .find(|c| RESERVED_KEY_CHARS.contains(c) || c.is_control())
        {
            return Err(UserValidationError::IdReservedCharacter { character });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Academic year of study, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AcademicYear(u8);

impl AcademicYear {
    /// Validate and construct an academic year.
    pub fn new(year: u8) -> Result<Self, AcademicYearError> {
        if year == 0 {
            return Err(AcademicYearError::Zero);
        }
        Ok(Self(year))
    }

    /// Numeric year.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for AcademicYear {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AcademicYear> for u8 {
    fn from(value: AcademicYear) -> Self {
        value.0
    }
}

impl TryFrom<u8> for AcademicYear {
    type Error = AcademicYearError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Student record as held by the record store.
///
/// ## Invariants
/// - `courses` is ordered, so iteration yields codes in ascending
///   lexicographic order.
/// - `query_count` only grows inside this service; resets happen externally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    matric_no: String,
    year: AcademicYear,
    courses: BTreeSet<CourseCode>,
    query_count: u32,
}

impl User {
    /// Construct a student record with no answered questions yet.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        matric_no: impl Into<String>,
        year: AcademicYear,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            matric_no: matric_no.into(),
            year,
            courses: BTreeSet::new(),
            query_count: 0,
        }
    }

    /// Replace the enrolled course set.
    #[must_use]
    pub fn with_courses(mut self, courses: impl IntoIterator<Item = CourseCode>) -> Self {
        self.courses = courses.into_iter().collect();
        self
    }

    /// Replace the stored question count.
    #[must_use]
    pub fn with_query_count(mut self, query_count: u32) -> Self {
        self.query_count = query_count;
        self
    }

    /// Record identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Institutional registration number.
    pub fn matric_no(&self) -> &str {
        self.matric_no.as_str()
    }

    /// Year of study.
    pub fn year(&self) -> AcademicYear {
        self.year
    }

    /// Enrolled course codes in ascending order.
    pub fn courses(&self) -> &BTreeSet<CourseCode> {
        &self.courses
    }

    /// Questions answered so far in the current quota window.
    pub fn query_count(&self) -> u32 {
        self.query_count
    }
}
