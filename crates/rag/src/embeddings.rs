//! Text Embeddings
//!
//! Maps normalized questions to fixed-dimension unit vectors so that the inner
//! product of two embeddings is their cosine similarity.

use std::sync::Arc;

use faq_assistant_config::{EncoderBackend, EncoderConfig};

use crate::RagError;

/// Sentence encoder shared read-only across request handlers
pub trait TextEncoder: Send + Sync {
    /// Encode a batch, one unit-norm vector per input, in input order
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Output dimension
    fn dim(&self) -> usize;
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |h, b| {
        (h ^ b as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Bag-of-words feature-hashing encoder
///
/// Needs no model weights, so it backs the test suite and deployments that
/// only want lexical matching.
#[derive(Debug, Clone)]
pub struct HashEncoder {
    dim: usize,
}

impl HashEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];

        for token in text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| !t.is_empty())
        {
            let idx = (fnv1a(token) % self.dim as u64) as usize;
            v[idx] += 1.0;
        }

        l2_normalize(&mut v);
        v
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new(faq_assistant_config::constants::retrieval::HASH_DIM)
    }
}

impl TextEncoder for HashEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

/// Construct the configured encoder
///
/// Loading model weights is slow and may hit the network; call once at startup.
pub fn build_encoder(config: &EncoderConfig) -> Result<Arc<dyn TextEncoder>, RagError> {
    match config.backend {
        EncoderBackend::Hash => {
            tracing::info!(dim = config.hash_dim, "Using hashing encoder");
            Ok(Arc::new(HashEncoder::new(config.hash_dim)))
        }
        #[cfg(feature = "candle")]
        EncoderBackend::Bert => {
            let encoder = crate::candle_embeddings::BertClsEncoder::load(config)?;
            Ok(Arc::new(encoder))
        }
        #[cfg(not(feature = "candle"))]
        EncoderBackend::Bert => Err(RagError::Model(format!(
            "encoder backend 'bert' ({}) requires building with the `candle` feature",
            config.model_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_hash_encoder_unit_norm() {
        let encoder = HashEncoder::new(128);
        let out = encoder
            .encode(&["apa itu jobmate", "x", "über café 123"])
            .unwrap();

        assert_eq!(out.len(), 3);
        for v in &out {
            assert_eq!(v.len(), 128);
            assert!((norm(v) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hash_encoder_empty_text_is_zero() {
        let encoder = HashEncoder::new(16);
        let out = encoder.encode(&[""]).unwrap();
        assert!(out[0].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_hash_encoder_deterministic_and_order_free() {
        let encoder = HashEncoder::default();
        let out = encoder
            .encode(&["cara daftar akun", "akun daftar cara"])
            .unwrap();
        assert!((dot(&out[0], &out[1]) - 1.0).abs() < 1e-5);

        let again = encoder.encode(&["cara daftar akun"]).unwrap();
        assert_eq!(out[0], again[0]);
    }

    #[test]
    fn test_hash_encoder_overlap_scores_higher() {
        let encoder = HashEncoder::default();
        let out = encoder
            .encode(&[
                "how do i reset my password",
                "reset my password",
                "salary range for engineers",
            ])
            .unwrap();
        assert!(dot(&out[0], &out[1]) > dot(&out[0], &out[2]));
    }

    #[test]
    fn test_minimum_dimension() {
        assert_eq!(HashEncoder::new(2).dim(), 8);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0; 4];
        l2_normalize(&mut zero);
        assert!(zero.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_build_hash_encoder() {
        let config = EncoderConfig {
            backend: EncoderBackend::Hash,
            hash_dim: 64,
            ..Default::default()
        };
        let encoder = build_encoder(&config).unwrap();
        assert_eq!(encoder.dim(), 64);
    }

    #[cfg(not(feature = "candle"))]
    #[test]
    fn test_bert_without_candle_is_model_error() {
        let config = EncoderConfig::default();
        assert!(matches!(build_encoder(&config), Err(RagError::Model(_))));
    }
}
