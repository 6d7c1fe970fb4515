//! Answer types
//!
//! `FaqAnswer` is what the composer hands back for every question and what the
//! HTTP layer serializes verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Picked from the matched FAQ entry's answer variants
    Retrieval,
    /// Produced by the generative fallback service
    Generated,
    /// Fallback needed but no generative client is configured
    Unavailable,
    /// Fallback attempted and failed
    Error,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Retrieval => "retrieval",
            Provenance::Generated => "generated",
            Provenance::Unavailable => "unavailable",
            Provenance::Error => "error",
        }
    }

    /// True for every outcome of the low-confidence path
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Provenance::Retrieval)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composed answer for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqAnswer {
    pub answer: String,
    /// Retrieval confidence, also reported on the fallback path
    pub confidence: f32,
    pub source: Provenance,
}

impl FaqAnswer {
    pub fn new(answer: impl Into<String>, confidence: f32, source: Provenance) -> Self {
        Self {
            answer: answer.into(),
            confidence,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_serializes_lowercase() {
        let json = serde_json::to_string(&Provenance::Unavailable).unwrap();
        assert_eq!(json, "\"unavailable\"");

        let parsed: Provenance = serde_json::from_str("\"generated\"").unwrap();
        assert_eq!(parsed, Provenance::Generated);
    }

    #[test]
    fn test_provenance_fallback_classification() {
        assert!(!Provenance::Retrieval.is_fallback());
        assert!(Provenance::Generated.is_fallback());
        assert!(Provenance::Unavailable.is_fallback());
        assert!(Provenance::Error.is_fallback());
    }

    #[test]
    fn test_answer_wire_shape() {
        let answer = FaqAnswer::new("Buka menu profil.", 0.91, Provenance::Retrieval);
        let value = serde_json::to_value(&answer).unwrap();

        assert_eq!(value["answer"], "Buka menu profil.");
        assert_eq!(value["source"], "retrieval");
        assert!((value["confidence"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    }
}
