//! Configuration management for the FAQ assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (FAQ_ASSISTANT__ prefix, `__` separator)
//!
//! Every field has a serde default, so an empty configuration directory yields
//! a runnable service.

pub mod constants;
pub mod persona;
pub mod settings;

pub use persona::PersonaConfig;
pub use settings::{
    load_settings, load_settings_from, CorpusConfig, EncoderBackend, EncoderConfig, LlmSettings,
    ObservabilityConfig, RetrievalConfig, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
