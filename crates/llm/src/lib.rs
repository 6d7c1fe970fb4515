//! Generative fallback
//!
//! Features:
//! - Gemini and OpenAI-compatible chat backends behind one trait
//! - Persona-driven prompt construction with retrieval context
//! - A responder that never fails: every outcome maps to text plus provenance

pub mod backend;
pub mod factory;
pub mod fallback;
pub mod prompt;

pub use backend::{
    FinishReason, GeminiBackend, GenerationResult, LlmBackend, LlmConfig, OpenAIBackend,
};
pub use factory::{LlmFactory, LlmProvider};
pub use fallback::{FallbackError, FallbackReply, FallbackResponder};
pub use prompt::{context_hint, Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
