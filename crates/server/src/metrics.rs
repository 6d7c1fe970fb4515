//! Prometheus metrics

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use faq_assistant_core::Provenance;

use crate::state::AppState;
use crate::ServerError;

pub const ANSWERS_TOTAL: &str = "faq_answers_total";
pub const RETRIEVAL_CONFIDENCE: &str = "faq_retrieval_confidence";
pub const ANSWER_LATENCY: &str = "faq_answer_latency_seconds";

const CONFIDENCE_BUCKETS: &[f64] = &[0.0, 0.25, 0.5, 0.6, 0.7, 0.75, 0.8, 0.85, 0.9, 0.95, 1.0];
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the global Prometheus recorder. Call once per process.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let startup = |e: metrics_exporter_prometheus::BuildError| ServerError::Startup(e.to_string());

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(RETRIEVAL_CONFIDENCE.to_string()),
            CONFIDENCE_BUCKETS,
        )
        .map_err(startup)?
        .set_buckets_for_metric(Matcher::Full(ANSWER_LATENCY.to_string()), LATENCY_BUCKETS)
        .map_err(startup)?
        .install_recorder()
        .map_err(startup)
}

pub fn record_answer(source: Provenance, confidence: f32, elapsed: Duration) {
    metrics::counter!(ANSWERS_TOTAL, "source" => source.as_str()).increment(1);
    metrics::histogram!(RETRIEVAL_CONFIDENCE).record(confidence as f64);
    metrics::histogram!(ANSWER_LATENCY).record(elapsed.as_secs_f64());
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
