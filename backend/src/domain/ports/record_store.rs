//! Driven port for the student record store.
//!
//! Adapters expose typed reads of users and courses, the query counter
//! write, and the append-only question log. They hold no business logic.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{Course, CourseCode, Error, QuestionRecord, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The store could not be reached.
        Connection { message: String } => "record store connection failed: {message}",
        /// The store did not answer within the request timeout.
        Timeout { message: String } => "record store timed out: {message}",
        /// The store answered with a failure status.
        Rejected { status: u16, message: String } =>
            "record store rejected request with status {status}: {message}",
        /// A stored record could not be decoded into the domain model.
        Decode { message: String } => "record store payload decode failed: {message}",
        /// A write would have replaced an existing record.
        Conflict { message: String } => "record store write conflict: {message}",
    }
}

impl RecordStoreError {
    /// Map into a domain `storage_error`, naming the failed operation.
    pub fn into_domain(self, operation: &'static str) -> Error {
        Error::storage(format!("record store failure during {operation}")).with_details(json!({
            "operation": operation,
            "cause": self.to_string(),
        }))
    }
}

/// Typed access to users, courses and the question log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a student record; `None` when no record exists.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError>;

    /// Fetch a course by its normalised code; `None` when unknown.
    async fn get_course(&self, code: &CourseCode) -> Result<Option<Course>, RecordStoreError>;

    /// Overwrite the student's query counter and nothing else.
    async fn update_query_count(&self, id: &UserId, count: u32) -> Result<(), RecordStoreError>;

    /// Append a question record under its owner's namespace.
    ///
    /// Implementations must never replace an existing record.
    async fn append_question(&self, record: &QuestionRecord) -> Result<(), RecordStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RecordStoreError::connection("refused"))]
    #[case(RecordStoreError::timeout("10s"))]
    #[case(RecordStoreError::rejected(401_u16, "Permission denied"))]
    #[case(RecordStoreError::decode("year must be at least 1"))]
    fn every_variant_maps_to_storage_error(#[case] error: RecordStoreError) {
        let cause = error.to_string();
        let mapped = error.into_domain("get_user");
        assert_eq!(mapped.code(), ErrorCode::StorageError);
        assert_eq!(mapped.message(), "record store failure during get_user");
        assert_eq!(
            mapped.details(),
            Some(&json!({"operation": "get_user", "cause": cause}))
        );
    }
}
