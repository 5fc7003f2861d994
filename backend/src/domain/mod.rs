//! Domain primitives, services and ports.
//!
//! Purpose: model students, courses and answered questions, and implement
//! the question-answering pipeline (quota, resolution, logging) against
//! ports so adapters stay swappable.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / UserId / AcademicYear: student records.
//! - Course / CourseCode: catalogue entries.
//! - QuestionText / QuestionRecord: questions and the append-only log.
//! - QuotaTracker / UserLocks: daily limit and per-student serialisation.
//! - AnswerResolver: course lookup with generative fallback.
//! - InteractionLogger: question log writer.
//! - AskService: orchestrator implementing the driving ports.

pub mod ask_service;
pub mod course;
pub mod error;
pub mod interaction_log;
pub mod persona;
pub mod ports;
pub mod question;
pub mod quota;
pub mod resolver;
pub mod trace_id;
pub mod user;

pub use self::ask_service::{AskService, AskServiceOptions, WEST_AFRICA_TIME};
pub use self::course::{Course, CourseCode, CourseCodeValidationError, CourseDetails};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::interaction_log::{InteractionEntry, InteractionLogger};
pub use self::persona::AssistantPersona;
pub use self::question::{
    QuestionId, QuestionRecord, QuestionRecordDraft, QuestionText, QuestionValidationError,
    format_timestamp,
};
pub use self::quota::{DAILY_QUERY_LIMIT, QuotaTracker, UserGuard, UserLocks};
pub use self::resolver::{
    AnswerResolver, DEFAULT_GENERATION_DEADLINE, MISSING_TOPIC_FALLBACK, Resolution,
    format_course_answer, match_enrolled_course,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AcademicYear, AcademicYearError, User, UserId, UserValidationError};
