//! Answer generator adapters.
//!
//! This module provides the chat-completions implementation of the
//! `AnswerGenerator` port.

mod dto;
mod openai;

pub use openai::{
    DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, DEFAULT_TEMPERATURE, OpenAiAnswerGenerator,
};
