//! Router integration tests
//!
//! Drive the full axum router in-process with `tower::ServiceExt::oneshot`,
//! using the hashing encoder so no model weights are needed.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use faq_assistant_agent::ResponseComposer;
use faq_assistant_config::{PersonaConfig, Settings};
use faq_assistant_llm::FallbackResponder;
use faq_assistant_rag::{
    FaqCorpus, FaqEntry, HashEncoder, RagError, RetrievalService, TextEncoder,
};
use faq_assistant_server::{create_router, AppState};

fn state_with(encoder: Arc<dyn TextEncoder>, settings: Settings) -> AppState {
    let corpus = FaqCorpus::from_entries(vec![
        FaqEntry::new("What is X?", "X is Y."),
        FaqEntry::new("Bagaimana cara daftar akun?", "Klik tombol Daftar.")
            .with_paraphrases(&["Cara registrasi akun"]),
    ])
    .unwrap();
    let retrieval = RetrievalService::build(corpus, encoder).unwrap();
    let composer = ResponseComposer::new(
        Arc::new(retrieval),
        FallbackResponder::disabled(PersonaConfig::default()),
        0.85,
    );
    AppState::new(composer, settings)
}

fn state() -> AppState {
    state_with(Arc::new(HashEncoder::default()), Settings::default())
}

#[derive(Clone, Copy)]
enum QueryFault {
    Fail,
    Stall(Duration),
}

/// Encodes the corpus normally, then misbehaves on single-question batches
struct FaultyEncoder {
    inner: HashEncoder,
    fault: QueryFault,
}

impl TextEncoder for FaultyEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.len() == 1 {
            match self.fault {
                QueryFault::Fail => {
                    return Err(RagError::Embedding("model session lost".to_string()))
                }
                QueryFault::Stall(delay) => std::thread::sleep(delay),
            }
        }
        self.inner.encode(texts)
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }
}

fn faulty(fault: QueryFault) -> Arc<dyn TextEncoder> {
    Arc::new(FaultyEncoder {
        inner: HashEncoder::default(),
        fault,
    })
}

fn app() -> Router {
    create_router(state())
}

async fn post_faq(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/faq")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_is_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_empty_object_is_bad_request() {
    let (status, body) = post_faq(app(), "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing 'question' field"}));
}

#[tokio::test]
async fn test_null_and_blank_question_are_bad_request() {
    for payload in [r#"{"question": null}"#, r#"{"question": "  "}"#, "[1, 2]"] {
        let (status, body) = post_faq(app(), payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["error"], "Missing 'question' field");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post_faq(app(), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'question' field");
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/faq")
                .body(Body::from(r#"{"question": "What is X?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_known_question_answers_from_corpus() {
    let (status, body) = post_faq(app(), r#"{"question": "What is X?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "X is Y.");
    assert_eq!(body["source"], "retrieval");
    assert!((body["confidence"].as_f64().unwrap() - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_paraphrase_answers_from_corpus() {
    let (status, body) = post_faq(app(), r#"{"question": "cara registrasi akun?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "retrieval");
    assert_eq!(body["answer"], "Klik tombol Daftar.");
}

#[tokio::test]
async fn test_unknown_question_without_credential_is_unavailable() {
    let (status, body) = post_faq(app(), r#"{"question": "qwxz plok"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "unavailable");
    assert_eq!(
        body["answer"],
        "Maaf, fitur AI canggih sedang tidak tersedia saat ini."
    );
    assert!(body["confidence"].as_f64().unwrap() < 0.85);
}

#[tokio::test]
async fn test_cors_is_permissive_by_default() {
    let response = app()
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://frontend.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let response = app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_rendered_when_enabled() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let state = state().with_metrics(recorder.handle());

    let response = create_router(state)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_query_failure_is_generic_500() {
    let app = create_router(state_with(faulty(QueryFault::Fail), Settings::default()));
    let (status, body) = post_faq(app, r#"{"question": "What is X?"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn test_request_timeout_is_generic_500() {
    let mut settings = Settings::default();
    settings.server.timeout_seconds = 1;
    let app = create_router(state_with(
        faulty(QueryFault::Stall(Duration::from_millis(1500))),
        settings,
    ));
    let (status, body) = post_faq(app, r#"{"question": "What is X?"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}
