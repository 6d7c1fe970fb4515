//! FAQ Assistant Server
//!
//! HTTP endpoints for question answering, liveness and Prometheus metrics.

pub mod bootstrap;
pub mod http;
pub mod metrics;
pub mod state;

pub use bootstrap::{build_composer, build_state};
pub use http::create_router;
pub use metrics::{init_metrics, record_answer};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use faq_assistant_agent::AgentError;
use faq_assistant_config::ConfigError;
use faq_assistant_llm::LlmError;
use faq_assistant_rag::RagError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Startup failed: {0}")]
    Startup(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) | ServerError::Startup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = match &self {
            ServerError::InvalidRequest(message) => serde_json::json!({ "error": message }),
            ServerError::Internal(_) | ServerError::Startup(_) => {
                tracing::error!(error = %self, "Request failed");
                serde_json::json!({ "error": "Internal Server Error" })
            }
        };
        (StatusCode::from(self), Json(body)).into_response()
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<RagError> for ServerError {
    fn from(err: RagError) -> Self {
        ServerError::Startup(err.to_string())
    }
}

impl From<LlmError> for ServerError {
    fn from(err: LlmError) -> Self {
        ServerError::Startup(err.to_string())
    }
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        ServerError::Startup(err.to_string())
    }
}
