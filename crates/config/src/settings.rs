//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, llm, models, retrieval};
use crate::{ConfigError, PersonaConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout applied by the router
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// When false every origin is allowed
    #[serde(default)]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            cors_enabled: false,
            cors_origins: Vec::new(),
        }
    }
}

/// FAQ corpus location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: String,
}

fn default_corpus_path() -> String {
    "dataset/faq.json".to_string()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

/// Which sentence encoder to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncoderBackend {
    /// BERT [CLS] pooling via candle
    #[default]
    Bert,
    /// Feature-hashing bag of words, no model weights
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    #[serde(default)]
    pub backend: EncoderBackend,

    /// HuggingFace model id, used when `model_dir` is unset
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Local directory holding config.json, tokenizer.json and model.safetensors
    #[serde(default)]
    pub model_dir: Option<String>,

    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,

    #[serde(default = "default_hash_dim")]
    pub hash_dim: usize,
}

fn default_model_id() -> String {
    models::DEFAULT_ENCODER_MODEL.to_string()
}
fn default_max_seq_len() -> usize {
    retrieval::MAX_SEQ_LEN
}
fn default_hash_dim() -> usize {
    retrieval::HASH_DIM
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            backend: EncoderBackend::default(),
            model_id: default_model_id(),
            model_dir: None,
            max_seq_len: default_max_seq_len(),
            hash_dim: default_hash_dim(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Inclusive lower bound for answering from the corpus
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    retrieval::DEFAULT_THRESHOLD
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Generative fallback service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// "gemini" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Overrides the provider's public endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Falls back to the provider's environment variable when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String {
    llm::DEFAULT_PROVIDER.to_string()
}
fn default_llm_model() -> String {
    llm::DEFAULT_GEMINI_MODEL.to_string()
}
fn default_llm_timeout() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}
fn default_max_tokens() -> usize {
    llm::DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    llm::DEFAULT_TEMPERATURE
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_llm_model(),
            endpoint: None,
            api_key: None,
            timeout_seconds: default_llm_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmSettings {
    /// Configured endpoint, or the provider's public one
    pub fn endpoint_or_default(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None if self.provider.eq_ignore_ascii_case("openai") => {
                endpoints::OPENAI_DEFAULT.to_string()
            }
            None => endpoints::GEMINI_DEFAULT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

impl Settings {
    /// Validate all settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_corpus()?;
        self.validate_encoder()?;
        self.validate_retrieval()?;
        self.validate_llm()?;
        Ok(())
    }

    pub fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        if self.server.timeout_seconds == 0 {
            return Err(invalid(
                "server.timeout_seconds",
                "Timeout must be at least 1 second",
            ));
        }
        Ok(())
    }

    pub fn validate_corpus(&self) -> Result<(), ConfigError> {
        if self.corpus.path.trim().is_empty() {
            return Err(invalid("corpus.path", "Corpus path cannot be empty"));
        }
        Ok(())
    }

    pub fn validate_encoder(&self) -> Result<(), ConfigError> {
        if self.encoder.max_seq_len < 2 {
            return Err(invalid(
                "encoder.max_seq_len",
                format!(
                    "Must leave room for [CLS] and [SEP], got {}",
                    self.encoder.max_seq_len
                ),
            ));
        }
        if self.encoder.hash_dim < 8 {
            return Err(invalid(
                "encoder.hash_dim",
                format!("Must be at least 8, got {}", self.encoder.hash_dim),
            ));
        }
        Ok(())
    }

    pub fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let threshold = self.retrieval.threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "retrieval.threshold",
                format!("Must be in [-1.0, 1.0], got {}", threshold),
            ));
        }
        Ok(())
    }

    pub fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_seconds == 0 {
            return Err(invalid(
                "llm.timeout_seconds",
                "Timeout must be at least 1 second",
            ));
        }
        Ok(())
    }
}

/// Load settings from `config/` relative to the working directory
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a config directory, an optional environment overlay and
/// `FAQ_ASSISTANT__*` environment variables, in that order of precedence
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("FAQ_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        threshold = settings.retrieval.threshold,
        encoder = ?settings.encoder.backend,
        "Settings loaded"
    );

    Ok(settings)
}
