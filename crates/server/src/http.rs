//! HTTP Endpoints

use std::time::{Duration, Instant};

use axum::error_handling::HandleErrorLayer;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use faq_assistant_core::FaqAnswer;

use crate::metrics::{metrics_handler, record_answer};
use crate::state::AppState;
use crate::ServerError;

const MISSING_QUESTION: &str = "Missing 'question' field";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/faq", post(faq))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(timeout),
        )
        .with_state(state)
}

/// Middleware failures, in practice only the request timeout, become a 500
async fn handle_layer_error(err: BoxError) -> ServerError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ServerError::Internal("request timed out".to_string())
    } else {
        ServerError::Internal(err.to_string())
    }
}

/// Permissive unless CORS is enabled with at least one valid origin
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::warn!("CORS enabled without valid origins, allowing all origins");
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Pull a non-blank `question` string out of an arbitrary JSON body
fn extract_question(payload: Result<Json<Value>, JsonRejection>) -> Result<String, ServerError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected /faq body");
        ServerError::InvalidRequest(MISSING_QUESTION.to_string())
    })?;

    body.get("question")
        .and_then(Value::as_str)
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServerError::InvalidRequest(MISSING_QUESTION.to_string()))
}

async fn faq(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FaqAnswer>, ServerError> {
    let question = extract_question(payload)?;
    let start = Instant::now();

    let answer = state.composer.answer(&question).await?;

    record_answer(answer.source, answer.confidence, start.elapsed());
    Ok(Json(answer))
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(value: Value) -> Result<Json<Value>, JsonRejection> {
        Ok(Json(value))
    }

    #[test]
    fn test_extract_question() {
        let q = extract_question(json(serde_json::json!({"question": "Apa itu JobMate?"})));
        assert_eq!(q.unwrap(), "Apa itu JobMate?");
    }

    #[test]
    fn test_extract_rejects_missing_null_blank_and_non_string() {
        for body in [
            serde_json::json!({}),
            serde_json::json!({"question": null}),
            serde_json::json!({"question": "   "}),
            serde_json::json!({"question": 42}),
            serde_json::json!(["question"]),
            serde_json::json!("question"),
        ] {
            match extract_question(json(body.clone())) {
                Err(ServerError::InvalidRequest(msg)) => assert_eq!(msg, MISSING_QUESTION),
                other => panic!("{body} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://jobmate.example".to_string()], true);
    }
}
