//! Candle BERT sentence encoder
//!
//! Runs a frozen BERT encoder on CPU and pools the hidden state of the `[CLS]`
//! token. Weights load read-only from safetensors (or a PyTorch checkpoint),
//! either from a local directory or from the HuggingFace hub.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use candle_core::{Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use faq_assistant_config::EncoderConfig;

use crate::embeddings::{l2_normalize, TextEncoder};
use crate::RagError;

/// Resolved model files
struct ModelFiles {
    config: PathBuf,
    tokenizer: TokenizerSource,
    weights: Weights,
}

enum TokenizerSource {
    Json(PathBuf),
    Vocab(PathBuf),
}

enum Weights {
    SafeTensors(PathBuf),
    Pth(PathBuf),
}

fn model_err(e: impl std::fmt::Display) -> RagError {
    RagError::Model(e.to_string())
}

fn embed_err(e: impl std::fmt::Display) -> RagError {
    RagError::Embedding(e.to_string())
}

impl ModelFiles {
    fn from_dir(dir: &Path) -> Result<Self, RagError> {
        let config = dir.join("config.json");
        if !config.exists() {
            return Err(RagError::Model(format!("{} not found", config.display())));
        }

        let tokenizer = if dir.join("tokenizer.json").exists() {
            TokenizerSource::Json(dir.join("tokenizer.json"))
        } else if dir.join("vocab.txt").exists() {
            TokenizerSource::Vocab(dir.join("vocab.txt"))
        } else {
            return Err(RagError::Model(format!(
                "no tokenizer.json or vocab.txt in {}",
                dir.display()
            )));
        };

        let weights = if dir.join("model.safetensors").exists() {
            Weights::SafeTensors(dir.join("model.safetensors"))
        } else if dir.join("pytorch_model.bin").exists() {
            Weights::Pth(dir.join("pytorch_model.bin"))
        } else {
            return Err(RagError::Model(format!(
                "no model.safetensors or pytorch_model.bin in {}",
                dir.display()
            )));
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }

    fn from_hub(model_id: &str) -> Result<Self, RagError> {
        use hf_hub::{api::sync::Api, Repo, RepoType};

        let api = Api::new().map_err(model_err)?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config = repo.get("config.json").map_err(model_err)?;
        let tokenizer = match repo.get("tokenizer.json") {
            Ok(path) => TokenizerSource::Json(path),
            Err(_) => TokenizerSource::Vocab(repo.get("vocab.txt").map_err(model_err)?),
        };
        let weights = match repo.get("model.safetensors") {
            Ok(path) => Weights::SafeTensors(path),
            Err(_) => Weights::Pth(repo.get("pytorch_model.bin").map_err(model_err)?),
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}

/// Build a BERT WordPiece tokenizer from a bare `vocab.txt`
fn tokenizer_from_vocab(path: &Path) -> Result<Tokenizer, RagError> {
    let text = std::fs::read_to_string(path).map_err(model_err)?;
    let vocab: serde_json::Map<String, serde_json::Value> = text
        .lines()
        .enumerate()
        .map(|(id, token)| (token.to_string(), serde_json::Value::from(id)))
        .collect();

    let token_id = |token: &str| {
        vocab
            .get(token)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| RagError::Model(format!("{} missing from vocab", token)))
    };
    let cls = token_id("[CLS]")?;
    let sep = token_id("[SEP]")?;

    let spec = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", sep],
            "cls": ["[CLS]", cls]
        },
        "decoder": null,
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab
        }
    });

    Tokenizer::from_str(&spec.to_string()).map_err(model_err)
}

/// BERT encoder with [CLS] pooling
pub struct BertClsEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl BertClsEncoder {
    /// Load from `config.model_dir`, or fetch `config.model_id` from the hub
    pub fn load(config: &EncoderConfig) -> Result<Self, RagError> {
        let files = match &config.model_dir {
            Some(dir) => ModelFiles::from_dir(Path::new(dir))?,
            None => {
                tracing::info!(model_id = %config.model_id, "Fetching encoder from HuggingFace hub");
                ModelFiles::from_hub(&config.model_id)?
            }
        };

        let device = Device::Cpu;

        let raw: serde_json::Value = {
            let text = std::fs::read_to_string(&files.config).map_err(model_err)?;
            serde_json::from_str(&text).map_err(model_err)?
        };
        let dim = raw
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| RagError::Model("config.json has no hidden_size".to_string()))?
            as usize;
        let bert_config: BertConfig = serde_json::from_value(raw).map_err(model_err)?;

        let vb = match &files.weights {
            // SAFETY: the file is memory-mapped read-only and not modified while loaded
            Weights::SafeTensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], DTYPE, &device).map_err(model_err)?
            },
            Weights::Pth(path) => VarBuilder::from_pth(path, DTYPE, &device).map_err(model_err)?,
        };
        let model = BertModel::load(vb, &bert_config).map_err(model_err)?;

        let mut tokenizer = match &files.tokenizer {
            TokenizerSource::Json(path) => Tokenizer::from_file(path).map_err(model_err)?,
            TokenizerSource::Vocab(path) => tokenizer_from_vocab(path)?,
        };
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_seq_len,
                ..Default::default()
            }))
            .map_err(model_err)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        tracing::info!(
            dim,
            max_seq_len = config.max_seq_len,
            "BERT encoder loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
        })
    }

    fn forward(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(embed_err)?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device).map_err(embed_err)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device).map_err(embed_err)?);
        }

        let input_ids = Tensor::stack(&ids, 0).map_err(embed_err)?;
        let attention_mask = Tensor::stack(&masks, 0).map_err(embed_err)?;
        let token_type_ids = input_ids.zeros_like().map_err(embed_err)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(embed_err)?;

        // (batch, seq, hidden) -> (batch, hidden) at the [CLS] position
        let cls = hidden.i((.., 0)).map_err(embed_err)?;
        let mut vectors = cls.to_vec2::<f32>().map_err(embed_err)?;

        for v in vectors.iter_mut() {
            l2_normalize(v);
        }
        Ok(vectors)
    }
}

impl TextEncoder for BertClsEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.forward(texts)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
