//! Response composer

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use faq_assistant_core::{FaqAnswer, Provenance};
use faq_assistant_llm::{context_hint, FallbackResponder};
use faq_assistant_rag::{FaqEntry, RetrievalService};

use crate::AgentError;

/// Which path a question takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answer from the matched entry
    Direct,
    /// Ask the generative service
    Fallback,
}

impl Route {
    /// `threshold` is inclusive
    pub fn for_confidence(confidence: f32, threshold: f32) -> Self {
        if confidence >= threshold {
            Route::Direct
        } else {
            Route::Fallback
        }
    }
}

pub struct ResponseComposer {
    retrieval: Arc<RetrievalService>,
    fallback: FallbackResponder,
    threshold: f32,
    rng: Mutex<StdRng>,
}

impl ResponseComposer {
    pub fn new(retrieval: Arc<RetrievalService>, fallback: FallbackResponder, threshold: f32) -> Self {
        Self::with_rng(retrieval, fallback, threshold, StdRng::from_entropy())
    }

    /// Use a caller-supplied RNG for answer selection
    pub fn with_rng(
        retrieval: Arc<RetrievalService>,
        fallback: FallbackResponder,
        threshold: f32,
        rng: StdRng,
    ) -> Self {
        Self {
            retrieval,
            fallback,
            threshold,
            rng: Mutex::new(rng),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn fallback_available(&self) -> bool {
        self.fallback.is_available()
    }

    fn pick_answer(&self, entry: &FaqEntry) -> String {
        let variants = entry.answer_variants();
        let mut rng = self.rng.lock();
        variants
            .choose(&mut *rng)
            .copied()
            .unwrap_or(entry.answer.as_str())
            .to_string()
    }

    pub async fn answer(&self, question: &str) -> Result<FaqAnswer, AgentError> {
        // Encoder inference is CPU bound
        let retrieval = Arc::clone(&self.retrieval);
        let question_owned = question.to_string();
        let (position, confidence) =
            tokio::task::spawn_blocking(move || retrieval.nearest(&question_owned))
                .await
                .map_err(|e| AgentError::Task(e.to_string()))??;
        let matched = self.retrieval.resolve(position, confidence)?;
        let answer = self.pick_answer(matched.entry);

        let composed = match Route::for_confidence(confidence, self.threshold) {
            Route::Direct => FaqAnswer::new(answer, confidence, Provenance::Retrieval),
            Route::Fallback => {
                let hint = context_hint(&matched.variant.original, &answer);
                let reply = self.fallback.respond(question, &hint).await;
                FaqAnswer::new(reply.text, confidence, reply.provenance)
            }
        };

        tracing::info!(
            confidence,
            threshold = self.threshold,
            source = %composed.source,
            "Answered question"
        );
        Ok(composed)
    }
}
