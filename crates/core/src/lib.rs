//! Core types for the FAQ assistant
//!
//! The answer provenance taxonomy and the composed answer returned to HTTP
//! callers, shared by the agent, llm and server crates.

pub mod answer;

pub use answer::{FaqAnswer, Provenance};
