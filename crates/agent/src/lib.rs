//! Answer composition
//!
//! Decides, per question, between answering straight from the FAQ corpus and
//! delegating to the generative fallback.

pub mod composer;

pub use composer::{ResponseComposer, Route};

use faq_assistant_rag::RagError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    #[error("Retrieval task failed: {0}")]
    Task(String),
}
