//! Startup wiring
//!
//! Builds the encoder, corpus index, fallback responder and composer from
//! settings. Every error here is fatal; the server never binds with a
//! partially built pipeline.

use std::sync::Arc;

use faq_assistant_agent::ResponseComposer;
use faq_assistant_config::Settings;
use faq_assistant_llm::FallbackResponder;
use faq_assistant_rag::{build_encoder, FaqCorpus, RetrievalService};

use crate::state::AppState;
use crate::ServerError;

/// Load the corpus, embed it and wire the composer. Blocking.
pub fn build_composer(settings: &Settings) -> Result<ResponseComposer, ServerError> {
    let encoder = build_encoder(&settings.encoder)?;
    let corpus = FaqCorpus::load(&settings.corpus.path)?;
    let retrieval = RetrievalService::build(corpus, encoder)?;

    let fallback = FallbackResponder::from_settings(settings)?;
    if !fallback.is_available() {
        tracing::warn!("Low-confidence questions will receive the unavailable message");
    }

    Ok(ResponseComposer::new(
        Arc::new(retrieval),
        fallback,
        settings.retrieval.threshold,
    ))
}

pub fn build_state(settings: Settings) -> Result<AppState, ServerError> {
    let composer = build_composer(&settings)?;
    Ok(AppState::new(composer, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_assistant_config::EncoderBackend;
    use std::io::Write;

    fn settings_for(path: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.encoder.backend = EncoderBackend::Hash;
        settings.corpus.path = path.display().to_string();
        settings.llm.api_key = Some(String::new());
        settings
    }

    #[test]
    fn test_build_state_from_corpus_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"question": "Apa itu JobMate?", "answer": "Platform kerja."}}]"#).unwrap();

        let state = build_state(settings_for(file.path())).unwrap();
        assert!((state.composer.threshold() - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_empty_corpus_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        assert!(matches!(
            build_composer(&settings_for(file.path())),
            Err(ServerError::Startup(_))
        ));
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let settings = settings_for(std::path::Path::new("/nonexistent/faq.json"));
        assert!(matches!(
            build_composer(&settings),
            Err(ServerError::Startup(_))
        ));
    }
}
