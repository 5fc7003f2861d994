//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AskCommand, CourseQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Question answering use-case.
    pub ask: Arc<dyn AskCommand>,
    /// Course lookup use-case.
    pub courses: Arc<dyn CourseQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use cs_assistant::domain::ports::{FixtureAskCommand, FixtureCourseQuery};
    /// use cs_assistant::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureAskCommand), Arc::new(FixtureCourseQuery));
    /// let _courses = state.courses.clone();
    /// ```
    pub fn new(ask: Arc<dyn AskCommand>, courses: Arc<dyn CourseQuery>) -> Self {
        Self { ask, courses }
    }
}
