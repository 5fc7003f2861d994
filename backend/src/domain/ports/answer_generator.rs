//! Driven port for generative answers.
//!
//! The domain owns the prompt shape; adapters translate it into a provider
//! request and hand back the completion text.

use async_trait::async_trait;

use super::define_port_error;

/// Single-turn prompt sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Persona and institutional context.
    pub system: String,
    /// The student's question, framed with their year of study.
    pub user: String,
}

define_port_error! {
    /// Errors surfaced while generating an answer.
    pub enum AnswerGeneratorError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "generator transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } => "generator timeout: {message}",
        /// The provider rate-limited the request.
        RateLimited { message: String } => "generator rate limited request: {message}",
        /// The provider answered with an error status or error body.
        Provider { status: u16, message: String } =>
            "generator provider error ({status}): {message}",
        /// The provider response could not be decoded.
        Decode { message: String } => "generator response decode failed: {message}",
        /// The provider returned no usable completion.
        EmptyCompletion => "generator returned no completion",
    }
}

/// Port producing free-text answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce the first completion for `prompt`.
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, AnswerGeneratorError>;
}

/// Offline generator returning a fixed acknowledgement.
///
/// Selected at startup when no provider is configured for local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAnswerGenerator;

impl FixtureAnswerGenerator {
    /// Text returned for every prompt.
    pub const ANSWER: &'static str =
        "The assistant is running offline. Please ask your lecturer or try again later.";
}

#[async_trait]
impl AnswerGenerator for FixtureAnswerGenerator {
    async fn generate(&self, _prompt: &GenerationPrompt) -> Result<String, AnswerGeneratorError> {
        Ok(Self::ANSWER.to_owned())
    }
}
