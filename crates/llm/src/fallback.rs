//! Fallback responder
//!
//! Answers questions the corpus could not match confidently. Exactly one
//! generation attempt per call, bounded by a timeout, never retried.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use faq_assistant_config::{PersonaConfig, Settings};
use faq_assistant_core::Provenance;

use crate::backend::{FinishReason, LlmBackend};
use crate::factory::LlmFactory;
use crate::prompt::PromptBuilder;
use crate::LlmError;

#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("generative fallback is not configured")]
    Unavailable,

    #[error("generative fallback timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Service(#[from] LlmError),
}

/// Text to return plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackReply {
    pub text: String,
    pub provenance: Provenance,
}

pub struct FallbackResponder {
    backend: Option<Arc<dyn LlmBackend>>,
    prompt: PromptBuilder,
    timeout: Duration,
}

impl FallbackResponder {
    pub fn new(
        backend: Option<Arc<dyn LlmBackend>>,
        persona: PersonaConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            prompt: PromptBuilder::new(persona),
            timeout,
        }
    }

    /// Responder that always reports the fallback as unavailable
    pub fn disabled(persona: PersonaConfig) -> Self {
        Self::new(None, persona, Duration::from_secs(1))
    }

    /// Build from settings. A missing credential yields a disabled responder;
    /// an unknown provider is a configuration error.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let backend = LlmFactory::create_backend(&settings.llm)?;
        Ok(Self::new(
            backend,
            settings.persona.clone(),
            Duration::from_secs(settings.llm.timeout_seconds),
        ))
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// One generation attempt
    pub async fn generate_answer(
        &self,
        question: &str,
        context_hint: &str,
    ) -> Result<String, FallbackError> {
        let backend = self.backend.as_ref().ok_or(FallbackError::Unavailable)?;
        let messages = self.prompt.build(question, context_hint);

        let result = tokio::time::timeout(self.timeout, backend.generate(&messages))
            .await
            .map_err(|_| FallbackError::Timeout(self.timeout))??;

        match result.finish_reason {
            FinishReason::Stop => {}
            FinishReason::Length => tracing::warn!(
                model = backend.model_name(),
                tokens = result.tokens,
                "Fallback answer truncated at the token limit"
            ),
            FinishReason::Other => tracing::warn!(
                model = backend.model_name(),
                "Fallback answer stopped early"
            ),
        }

        tracing::debug!(
            model = backend.model_name(),
            tokens = result.tokens,
            elapsed_ms = result.total_time_ms,
            finish_reason = ?result.finish_reason,
            "Fallback answer generated"
        );
        Ok(result.text)
    }

    /// Like `generate_answer`, but every failure becomes a fixed message
    pub async fn respond(&self, question: &str, context_hint: &str) -> FallbackReply {
        let persona = self.prompt.persona();
        match self.generate_answer(question, context_hint).await {
            Ok(text) => FallbackReply {
                text,
                provenance: Provenance::Generated,
            },
            Err(FallbackError::Unavailable) => FallbackReply {
                text: persona.unavailable_message.clone(),
                provenance: Provenance::Unavailable,
            },
            Err(e) => {
                tracing::error!(error = %e, "Generative fallback failed");
                FallbackReply {
                    text: persona.apology_message.clone(),
                    provenance: Provenance::Error,
                }
            }
        }
    }
}
