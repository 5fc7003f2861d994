//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod answer_generator;
mod ask_command;
mod course_query;
mod record_store;

#[cfg(test)]
pub use answer_generator::MockAnswerGenerator;
pub use answer_generator::{
    AnswerGenerator, AnswerGeneratorError, FixtureAnswerGenerator, GenerationPrompt,
};
#[cfg(test)]
pub use ask_command::MockAskCommand;
pub use ask_command::{AnswerSource, AskCommand, AskRequest, AskResponse, FixtureAskCommand};
#[cfg(test)]
pub use course_query::MockCourseQuery;
pub use course_query::{CourseQuery, FixtureCourseQuery};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{RecordStore, RecordStoreError};
