//! Driving port for answering a student's question.
//!
//! Inbound adapters call this port with already-validated inputs and map the
//! returned [`Error`] onto their own envelope.

use async_trait::async_trait;

use crate::domain::{Error, QuestionText, UserId};

/// Validated question submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    /// Student asking the question.
    pub user_id: UserId,
    /// Question text.
    pub question: QuestionText,
    /// Optional course hint, logged verbatim and not used for matching.
    pub course_code_hint: Option<String>,
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Formatted from an enrolled course's record.
    CourseLookup,
    /// Returned by the answer generator.
    Generated,
}

/// Outcome of a successful question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    /// Answer text returned to the student.
    pub answer: String,
    /// Resolution path taken.
    pub source: AnswerSource,
    /// Student's query count after this question.
    pub query_count: u32,
}

/// Use-case port for `ask`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AskCommand: Send + Sync {
    /// Answer one question, enforcing the student's daily quota.
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, Error>;
}

/// Fixture command echoing the question back as a generated answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAskCommand;

#[async_trait]
impl AskCommand for FixtureAskCommand {
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, Error> {
        Ok(AskResponse {
            answer: format!("You asked: {}", request.question),
            source: AnswerSource::Generated,
            query_count: 1,
        })
    }
}
