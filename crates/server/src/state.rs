//! Application State
//!
//! Shared state across all handlers. Everything is built before the listener
//! binds and is read-only afterwards.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use faq_assistant_agent::ResponseComposer;
use faq_assistant_config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<ResponseComposer>,
    pub settings: Arc<Settings>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(composer: ResponseComposer, settings: Settings) -> Self {
        Self {
            composer: Arc::new(composer),
            settings: Arc::new(settings),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
