//! FAQ retrieval
//!
//! Features:
//! - Unicode-aware question normalization
//! - Sentence embeddings: candle BERT with [CLS] pooling, or a feature-hashing fallback
//! - Typed FAQ corpus loading with variant expansion
//! - Exact inner-product search over an in-memory `ndarray` matrix

#[cfg(feature = "candle")]
pub mod candle_embeddings;
pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod normalize;
pub mod retriever;

#[cfg(feature = "candle")]
pub use candle_embeddings::BertClsEncoder;
pub use corpus::{FaqCorpus, FaqEntry, IndexedVariant};
pub use embeddings::{build_encoder, l2_normalize, HashEncoder, TextEncoder};
pub use index::FlatIndex;
pub use normalize::normalize;
pub use retriever::{RetrievalMatch, RetrievalService};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("FAQ corpus is empty")]
    CorpusEmpty,
}
