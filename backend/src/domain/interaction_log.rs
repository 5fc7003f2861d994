//! Append-only question log.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::domain::ports::RecordStore;
use crate::domain::{Error, QuestionId, QuestionRecord, QuestionRecordDraft, UserId};

/// One answered question, ready to be persisted.
#[derive(Debug, Clone)]
pub struct InteractionEntry {
    pub user_id: UserId,
    pub question: String,
    pub answer: String,
    pub course_code_hint: Option<String>,
    pub asked_at: DateTime<FixedOffset>,
}

/// Persists interactions as immutable records under fresh identifiers.
pub struct InteractionLogger<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> InteractionLogger<S> {
    /// Logger writing through `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> InteractionLogger<S>
where
    S: RecordStore + ?Sized,
{
    /// Store `entry` and return the persisted record.
    ///
    /// # Errors
    /// `storage_error` when the store rejects the append.
    pub async fn log(&self, entry: InteractionEntry) -> Result<QuestionRecord, Error> {
        let InteractionEntry {
            user_id,
            question,
            answer,
            course_code_hint,
            asked_at,
        } = entry;
        let record = QuestionRecord::new(
            QuestionId::random(),
            QuestionRecordDraft {
                user_id,
                question,
                response: answer,
                course_code: course_code_hint,
                asked_at,
            },
        );
        self.store
            .append_question(&record)
            .await
            .map_err(|err| err.into_domain("append_question"))?;
        Ok(record)
    }
}
