//! Student questions and their persisted interaction records.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Maximum accepted question length, in characters.
pub const QUESTION_MAX_CHARS: usize = 4000;

/// Validation errors for [`QuestionText`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionValidationError {
    Empty,
    TooLong { max: usize },
}

impl fmt::Display for QuestionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "question must not be empty"),
            Self::TooLong { max } => write!(f, "question must be at most {max} characters"),
        }
    }
}

impl std::error::Error for QuestionValidationError {}

/// Free-text question, kept exactly as the student sent it.
///
/// Validation looks at the trimmed text: it must be non-empty and at most
/// [`QUESTION_MAX_CHARS`] characters. The stored value, which is logged and
/// sent to the generator, keeps any surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionText(String);

impl QuestionText {
    /// Validate a question without altering it.
    pub fn new(text: impl AsRef<str>) -> Result<Self, QuestionValidationError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(QuestionValidationError::Empty);
        }
        if trimmed.chars().count() > QUESTION_MAX_CHARS {
            return Err(QuestionValidationError::TooLong {
                max: QUESTION_MAX_CHARS,
            });
        }
        Ok(Self(text.as_ref().to_owned()))
    }
}

impl AsRef<str> for QuestionText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for QuestionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Identifier of a persisted question record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(Uuid);

impl QuestionId {
    /// Fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable record of one answered question.
///
/// ## Invariants
/// - `asked_at` carries the reference offset it was created with; the stored
///   form is RFC 3339 with microsecond precision, so records of one offset
///   sort lexicographically by time.
/// - `course_code` is the caller's hint, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    id: QuestionId,
    user_id: UserId,
    question: String,
    response: String,
    course_code: Option<String>,
    asked_at: DateTime<FixedOffset>,
}

/// Field bundle for [`QuestionRecord::new`].
#[derive(Debug, Clone)]
pub struct QuestionRecordDraft {
    pub user_id: UserId,
    pub question: String,
    pub response: String,
    pub course_code: Option<String>,
    pub asked_at: DateTime<FixedOffset>,
}

impl QuestionRecord {
    /// Assemble a record under `id`.
    pub fn new(id: QuestionId, draft: QuestionRecordDraft) -> Self {
        let QuestionRecordDraft {
            user_id,
            question,
            response,
            course_code,
            asked_at,
        } = draft;
        Self {
            id,
            user_id,
            question,
            response,
            course_code,
            asked_at,
        }
    }

    /// Record identifier.
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Owning student.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Question as asked.
    pub fn question(&self) -> &str {
        self.question.as_str()
    }

    /// Answer returned to the student.
    pub fn response(&self) -> &str {
        self.response.as_str()
    }

    /// Course hint supplied with the question.
    pub fn course_code(&self) -> Option<&str> {
        self.course_code.as_deref()
    }

    /// Creation time in the reference offset.
    pub fn asked_at(&self) -> DateTime<FixedOffset> {
        self.asked_at
    }

    /// Creation time in its stored textual form.
    pub fn timestamp(&self) -> String {
        format_timestamp(self.asked_at)
    }
}

/// Render a timestamp in the persisted layout, e.g.
/// `2026-10-19T14:05:09.000000+01:00`.
pub fn format_timestamp(at: DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("  what is recursion?  ", "  what is recursion?  ")]
    #[case("  what is a heap?\n", "  what is a heap?\n")]
    #[case("CSC101", "CSC101")]
    fn keeps_questions_verbatim(#[case] raw: &str, #[case] expected: &str) {
        let text = QuestionText::new(raw).expect("valid question");
        assert_eq!(text.as_ref(), expected);
    }

    #[rstest]
    fn rejects_blank_questions() {
        assert_eq!(QuestionText::new(" \n "), Err(QuestionValidationError::Empty));
    }

    #[rstest]
    fn length_limit_ignores_surrounding_whitespace() {
        let raw = format!("  {}  ", "q".repeat(QUESTION_MAX_CHARS));
        let text = QuestionText::new(&raw).expect("limit applies to trimmed text");
        assert_eq!(text.as_ref(), raw);
    }

    #[rstest]
    fn rejects_overlong_questions() {
        let raw = "q".repeat(QUESTION_MAX_CHARS + 1);
        assert_eq!(
            QuestionText::new(raw),
            Err(QuestionValidationError::TooLong {
                max: QUESTION_MAX_CHARS
            })
        );
    }

    #[rstest]
    fn timestamps_keep_offset_and_fixed_precision() {
        let offset = FixedOffset::east_opt(3600).expect("valid offset");
        let at = offset
            .with_ymd_and_hms(2026, 10, 19, 14, 5, 9)
            .single()
            .expect("unambiguous time");
        assert_eq!(format_timestamp(at), "2026-10-19T14:05:09.000000+01:00");
    }
}
