//! Centralized defaults
//!
//! Single source of truth for values that several crates need to agree on.

/// Retrieval tuning
pub mod retrieval {
    /// Minimum inner-product score for answering straight from the corpus (inclusive)
    pub const DEFAULT_THRESHOLD: f32 = 0.85;

    /// Token budget per question variant fed to the encoder
    pub const MAX_SEQ_LEN: usize = 64;

    /// Output dimension of the hashing encoder
    pub const HASH_DIM: usize = 384;
}

/// Encoder model defaults
pub mod models {
    /// HuggingFace id of the sentence encoder
    pub const DEFAULT_ENCODER_MODEL: &str = "indolem/indobert-base-uncased";
}

/// Generative service defaults
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "gemini";
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_MAX_TOKENS: usize = 512;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
}

/// Service endpoints
pub mod endpoints {
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com";
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";
}

/// Environment variables read outside the `FAQ_ASSISTANT__` tree
pub mod env {
    /// Selects `config/{env}.yaml`
    pub const ENVIRONMENT: &str = "FAQ_ASSISTANT_ENV";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
}
