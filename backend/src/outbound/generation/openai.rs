//! Reqwest-backed chat-completions generator.
//!
//! Sends the persona and the framed question as a two-message chat and
//! returns the first choice verbatim. Works with OpenAI and any endpoint
//! speaking the same protocol.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{ChatMessageDto, ChatRequestDto, ChatResponseDto, ErrorEnvelopeDto};
use crate::domain::ports::{AnswerGenerator, AnswerGeneratorError, GenerationPrompt};

/// Chat-completions endpoint used when none is configured.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Model used when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Chat-completions adapter for the [`AnswerGenerator`] port.
pub struct OpenAiAnswerGenerator {
    client: Client,
    endpoint: Url,
    model: String,
    temperature: f32,
    api_key: Zeroizing<String>,
}

impl OpenAiAnswerGenerator {
    /// Build a generator for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model: DEFAULT_OPENAI_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    /// Use `model` instead of the default.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use `temperature` instead of the default.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn request_body<'a>(&'a self, prompt: &'a GenerationPrompt) -> ChatRequestDto<'a> {
        ChatRequestDto {
            model: &self.model,
            messages: [
                ChatMessageDto {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessageDto {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiAnswerGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, AnswerGeneratorError> {
        debug!(model = %self.model, "requesting completion");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_completion(body.as_ref())
    }
}

fn parse_completion(body: &[u8]) -> Result<String, AnswerGeneratorError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        AnswerGeneratorError::decode(format!("invalid completion JSON payload: {error}"))
    })?;
    decoded
        .into_first_content()
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(AnswerGeneratorError::empty_completion)
}

fn map_transport_error(error: reqwest::Error) -> AnswerGeneratorError {
    let error = error.without_url();
    if error.is_timeout() {
        AnswerGeneratorError::timeout(error.to_string())
    } else {
        AnswerGeneratorError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AnswerGeneratorError {
    let message = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS => AnswerGeneratorError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            AnswerGeneratorError::timeout(format!("status {}: {message}", status.as_u16()))
        }
        _ => AnswerGeneratorError::provider(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let truncated: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{truncated}...")
    } else {
        compact
    }
}
