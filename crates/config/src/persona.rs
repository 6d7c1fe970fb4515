//! Assistant persona
//!
//! Drives the role-establishing part of the fallback prompt and the fixed
//! messages returned when the fallback cannot produce an answer.

use serde::{Deserialize, Serialize};

/// Persona configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Name the assistant introduces itself with
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Product the FAQ is about
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Who is asking
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Language replies must be written in
    #[serde(default = "default_language")]
    pub language: String,

    /// Tone of replies
    #[serde(default = "default_tone")]
    pub tone: String,

    /// Returned when no generative client is configured
    #[serde(default = "default_unavailable_message")]
    pub unavailable_message: String,

    /// Returned when the generative call fails
    #[serde(default = "default_apology_message")]
    pub apology_message: String,
}

fn default_assistant_name() -> String {
    "JobMate Assistant".to_string()
}
fn default_platform() -> String {
    "JobMate".to_string()
}
fn default_audience() -> String {
    "job seekers using the JobMate job search platform".to_string()
}
fn default_language() -> String {
    "Indonesian".to_string()
}
fn default_tone() -> String {
    "relaxed and friendly".to_string()
}
fn default_unavailable_message() -> String {
    "Maaf, fitur AI canggih sedang tidak tersedia saat ini.".to_string()
}
fn default_apology_message() -> String {
    "Maaf, terjadi sedikit kendala saat mencoba menjawab. Silakan coba lagi.".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            platform: default_platform(),
            audience: default_audience(),
            language: default_language(),
            tone: default_tone(),
            unavailable_message: default_unavailable_message(),
            apology_message: default_apology_message(),
        }
    }
}
