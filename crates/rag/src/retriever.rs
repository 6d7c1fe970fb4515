//! Retrieval engine
//!
//! Owns the corpus, its variant embeddings and the encoder. Built once at
//! startup and only read afterwards, so it is shared behind an `Arc` without locks.

use std::sync::Arc;

use crate::corpus::{FaqCorpus, FaqEntry, IndexedVariant};
use crate::embeddings::TextEncoder;
use crate::index::FlatIndex;
use crate::normalize::normalize;
use crate::RagError;

/// Best match for one question
#[derive(Debug, Clone, Copy)]
pub struct RetrievalMatch<'a> {
    pub variant: &'a IndexedVariant,
    pub entry: &'a FaqEntry,
    /// Raw inner product in [-1, 1]
    pub confidence: f32,
}

pub struct RetrievalService {
    corpus: FaqCorpus,
    index: FlatIndex,
    encoder: Arc<dyn TextEncoder>,
}

impl RetrievalService {
    /// Encode every question variant in one batch and index it
    pub fn build(corpus: FaqCorpus, encoder: Arc<dyn TextEncoder>) -> Result<Self, RagError> {
        if corpus.is_empty() {
            return Err(RagError::CorpusEmpty);
        }

        let texts: Vec<&str> = corpus
            .variants()
            .iter()
            .map(|v| v.normalized.as_str())
            .collect();
        let vectors = encoder.encode(&texts)?;
        if vectors.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "encoder returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        let mut index = FlatIndex::new(encoder.dim());
        index.add_batch(&vectors)?;

        tracing::info!(
            entries = corpus.entries().len(),
            variants = index.len(),
            dim = index.dim(),
            "Retrieval index built"
        );

        Ok(Self {
            corpus,
            index,
            encoder,
        })
    }

    /// Nearest question variant for `question`
    pub fn retrieve(&self, question: &str) -> Result<RetrievalMatch<'_>, RagError> {
        let (position, confidence) = self.nearest(question)?;
        self.resolve(position, confidence)
    }

    /// Encode `question` and return the best index position with its score.
    /// Runs the encoder, so async callers should keep it off runtime threads.
    pub fn nearest(&self, question: &str) -> Result<(usize, f32), RagError> {
        if self.index.is_empty() {
            return Err(RagError::CorpusEmpty);
        }

        let normalized = normalize(question);
        let query = self
            .encoder
            .encode(&[normalized.as_str()])?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("encoder returned no vector".to_string()))?;

        self.index
            .search(&query, 1)?
            .into_iter()
            .next()
            .ok_or(RagError::CorpusEmpty)
    }

    /// Look up the variant and entry behind an index position
    pub fn resolve(&self, position: usize, confidence: f32) -> Result<RetrievalMatch<'_>, RagError> {
        let variant = self
            .corpus
            .variants()
            .get(position)
            .ok_or_else(|| RagError::Index(format!("position {} has no variant", position)))?;
        let entry = self
            .corpus
            .entry(variant.entry)
            .ok_or_else(|| RagError::Index(format!("variant points at missing entry {}", variant.entry)))?;

        tracing::debug!(
            confidence,
            matched = %variant.original,
            "Retrieved nearest FAQ variant"
        );

        Ok(RetrievalMatch {
            variant,
            entry,
            confidence,
        })
    }

    pub fn corpus(&self) -> &FaqCorpus {
        &self.corpus
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEncoder;

    fn service() -> RetrievalService {
        let corpus = FaqCorpus::from_entries(vec![
            FaqEntry::new("What is X?", "X is Y."),
            FaqEntry::new("How do I reset my password?", "Use the reset link.")
                .with_paraphrases(&["I forgot my password"]),
        ])
        .unwrap();
        RetrievalService::build(corpus, Arc::new(HashEncoder::default())).unwrap()
    }

    #[test]
    fn test_exact_question_scores_one() {
        let service = service();
        let m = service.retrieve("What is X?").unwrap();
        assert_eq!(m.entry.answer, "X is Y.");
        assert!((m.confidence - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalization_applies_to_queries() {
        let service = service();
        let m = service.retrieve("  what IS x ").unwrap();
        assert!((m.confidence - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_paraphrase_maps_to_entry() {
        let service = service();
        let m = service.retrieve("I forgot my password!").unwrap();
        assert_eq!(m.variant.original, "I forgot my password");
        assert_eq!(m.entry.question, "How do I reset my password?");
        assert_eq!(service.len(), 3);
    }

    #[test]
    fn test_unrelated_query_is_low_confidence() {
        let service = service();
        let m = service.retrieve("zzzz qqqq").unwrap();
        assert!(m.confidence < 0.85);
    }

    #[test]
    fn test_nearest_then_resolve_matches_retrieve() {
        let service = service();
        let (position, confidence) = service.nearest("I forgot my password").unwrap();
        let m = service.resolve(position, confidence).unwrap();
        assert_eq!(m.entry.answer, "Use the reset link.");
        assert!(service.resolve(99, confidence).is_err());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let corpus = FaqCorpus::from_entries(Vec::new()).unwrap();
        let result = RetrievalService::build(corpus, Arc::new(HashEncoder::default()));
        assert!(matches!(result, Err(RagError::CorpusEmpty)));
    }

    struct ShortEncoder;

    impl TextEncoder for ShortEncoder {
        fn encode(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(Vec::new())
        }

        fn dim(&self) -> usize {
            8
        }
    }

    #[test]
    fn test_encoder_count_mismatch() {
        let corpus = FaqCorpus::from_entries(vec![FaqEntry::new("Q", "A")]).unwrap();
        let result = RetrievalService::build(corpus, Arc::new(ShortEncoder));
        assert!(matches!(result, Err(RagError::Embedding(_))));
    }
}
