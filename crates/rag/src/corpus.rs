//! FAQ corpus loading
//!
//! The corpus is a JSON array of entries, each a canonical question and answer
//! plus optional paraphrases of both. Every question variant becomes one
//! `IndexedVariant`; all variants of an entry share the same answer set.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::normalize::normalize;
use crate::RagError;

/// One FAQ entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqEntry {
    pub question: String,
    #[serde(default)]
    pub paraphrases: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub answer_paraphrases: Vec<String>,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            paraphrases: Vec::new(),
            answer: answer.into(),
            answer_paraphrases: Vec::new(),
        }
    }

    pub fn with_paraphrases(mut self, paraphrases: &[&str]) -> Self {
        self.paraphrases = paraphrases.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_answer_paraphrases(mut self, answers: &[&str]) -> Self {
        self.answer_paraphrases = answers.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Canonical question first, then paraphrases
    pub fn question_variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.question.as_str()).chain(self.paraphrases.iter().map(String::as_str))
    }

    /// Canonical answer first, then paraphrases. Never empty.
    pub fn answer_variants(&self) -> Vec<&str> {
        std::iter::once(self.answer.as_str())
            .chain(self.answer_paraphrases.iter().map(String::as_str))
            .collect()
    }
}

/// A searchable question variant
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedVariant {
    /// Normalized text fed to the encoder
    pub normalized: String,
    /// Position of the owning entry in the corpus
    pub entry: usize,
    /// Question text as written in the corpus
    pub original: String,
}

/// Validated FAQ corpus with its expanded variant list
#[derive(Debug, Clone)]
pub struct FaqCorpus {
    entries: Vec<FaqEntry>,
    variants: Vec<IndexedVariant>,
}

impl FaqCorpus {
    /// Load and validate a corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RagError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Corpus(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<FaqEntry> = serde_json::from_str(&content)
            .map_err(|e| RagError::Corpus(format!("{}: {}", path.display(), e)))?;

        let corpus = Self::from_entries(entries)?;
        tracing::info!(
            path = %path.display(),
            entries = corpus.entries.len(),
            variants = corpus.variants.len(),
            "Loaded FAQ corpus"
        );
        Ok(corpus)
    }

    /// Validate entries and expand their question variants
    pub fn from_entries(entries: Vec<FaqEntry>) -> Result<Self, RagError> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(RagError::Corpus(format!("entry {} has a blank question", i)));
            }
            if entry.answer.trim().is_empty() {
                return Err(RagError::Corpus(format!("entry {} has a blank answer", i)));
            }
        }

        let variants = entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| {
                entry.question_variants().map(move |q| IndexedVariant {
                    normalized: normalize(q),
                    entry: i,
                    original: q.to_string(),
                })
            })
            .collect();

        Ok(Self { entries, variants })
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn variants(&self) -> &[IndexedVariant] {
        &self.variants
    }

    pub fn entry(&self, index: usize) -> Option<&FaqEntry> {
        self.entries.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
