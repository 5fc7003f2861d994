//! Course catalogue entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::user::RESERVED_KEY_CHARS;

/// Maximum accepted length of a course code.
pub const COURSE_CODE_MAX: usize = 64;

/// Validation errors for [`CourseCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseCodeValidationError {
    Empty,
    TooLong { max: usize },
    ReservedCharacter { character: char },
}

impl fmt::Display for CourseCodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "course code must not be empty"),
            Self::TooLong { max } => write!(f, "course code must be at most {max} characters"),
            Self::ReservedCharacter { character } => {
                write!(f, "course code must not contain {character:?}")
            }
        }
    }
}

impl std::error::Error for CourseCodeValidationError {}

/// Course code normalised to upper case, e.g. `CSC101`.
///
/// Lookups are case-insensitive because construction upper-cases the input.
/// Codes are otherwise opaque: anything usable as a record-store key is
/// accepted, so `CSC-202` is as valid as `CSC202`.
///
/// # Examples
/// ```
/// use cs_assistant::domain::CourseCode;
///
/// let code = CourseCode::new(" csc101 ").expect("valid code");
/// assert_eq!(code.as_ref(), "CSC101");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Trim and upper-case a course code, rejecting record-store key characters.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CourseCodeValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CourseCodeValidationError::Empty);
        }
        if trimmed.chars().count() > COURSE_CODE_MAX {
            return Err(CourseCodeValidationError::TooLong {
                max: COURSE_CODE_MAX,
            });
        }
        if let Some(character) = trimmed
            .chars()
            .find(|c| RESERVED_KEY_CHARS.contains(c) || c.is_control())
        {
            return Err(CourseCodeValidationError::ReservedCharacter { character });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Whether this code appears anywhere in `text`, ignoring case.
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        text.to_ascii_uppercase().contains(self.0.as_str())
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Read-only course record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    code: CourseCode,
    title: String,
    lecturer: Option<String>,
    next_topic: Option<String>,
    lab_schedule: Option<String>,
}

/// Optional course attributes, grouped to keep [`Course::new`] short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDetails {
    pub lecturer: Option<String>,
    pub next_topic: Option<String>,
    pub lab_schedule: Option<String>,
}

impl Course {
    /// Construct a course record.
    pub fn new(code: CourseCode, title: impl Into<String>, details: CourseDetails) -> Self {
        let CourseDetails {
            lecturer,
            next_topic,
            lab_schedule,
        } = details;
        Self {
            code,
            title: title.into(),
            lecturer,
            next_topic,
            lab_schedule,
        }
    }

    /// Catalogue key.
    pub fn code(&self) -> &CourseCode {
        &self.code
    }

    /// Course title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Lecturer in charge, when recorded.
    pub fn lecturer(&self) -> Option<&str> {
        self.lecturer.as_deref()
    }

    /// Upcoming topic, when recorded.
    pub fn next_topic(&self) -> Option<&str> {
        self.next_topic.as_deref()
    }

    /// Lab timetable, when recorded.
    pub fn lab_schedule(&self) -> Option<&str> {
        self.lab_schedule.as_deref()
    }
}
