//! CS Assistant backend library.
//!
//! Answers Computer Science students' questions from their enrolled courses'
//! records, falling back to a text generator, under a daily per-student
//! quota.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
