//! LLM Factory
//!
//! Creates the configured backend, resolving the credential from settings or
//! the provider's environment variable. A missing credential is not an error:
//! the factory returns `None` and the fallback runs in unavailable mode.

use std::str::FromStr;
use std::sync::Arc;

use faq_assistant_config::constants::env;
use faq_assistant_config::LlmSettings;

use crate::backend::{GeminiBackend, LlmBackend, LlmConfig, OpenAIBackend};
use crate::LlmError;

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Gemini,
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "gpt" => Ok(LlmProvider::OpenAI),
            other => Err(LlmError::Configuration(format!(
                "unknown LLM provider '{}'",
                other
            ))),
        }
    }
}

impl LlmProvider {
    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => env::GOOGLE_API_KEY,
            LlmProvider::OpenAI => env::OPENAI_API_KEY,
        }
    }
}

/// Factory for creating LLM backends
pub struct LlmFactory;

impl LlmFactory {
    /// Build the configured backend, or `None` when no credential is available
    pub fn create_backend(
        settings: &LlmSettings,
    ) -> Result<Option<Arc<dyn LlmBackend>>, LlmError> {
        Self::create_backend_with(settings, |name| std::env::var(name).ok())
    }

    /// Same as `create_backend` with an injectable environment lookup
    pub fn create_backend_with(
        settings: &LlmSettings,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Arc<dyn LlmBackend>>, LlmError> {
        let provider: LlmProvider = settings.provider.parse()?;

        let api_key = settings
            .api_key
            .clone()
            .or_else(|| lookup_env(provider.api_key_env()))
            .filter(|key| !key.trim().is_empty());

        let Some(api_key) = api_key else {
            tracing::warn!(
                provider = ?provider,
                env_var = provider.api_key_env(),
                "No API key configured; generative fallback disabled"
            );
            return Ok(None);
        };

        let config = LlmConfig::from_settings(settings, api_key);
        let backend: Arc<dyn LlmBackend> = match provider {
            LlmProvider::Gemini => Arc::new(GeminiBackend::new(config)?),
            LlmProvider::OpenAI => Arc::new(OpenAIBackend::new(config)?),
        };

        tracing::info!(
            provider = ?provider,
            model = backend.model_name(),
            "Generative fallback enabled"
        );
        Ok(Some(backend))
    }
}
