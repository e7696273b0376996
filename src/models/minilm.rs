/*
Sentence-transformers MiniLM

https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2
https://huggingface.co/sentence-transformers/all-MiniLM-L12-v2

BertModel -> mean pooling over non-padding tokens -> L2 normalization, which
is the module stack declared in the checkpoints' modules.json.
*/

use std::fmt;
use std::str::FromStr;

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationParams};

use crate::core::{PipelineError, Result};
use crate::loaders::CheckpointFiles;
use crate::pipelines::embedding::EmbeddingModel;
use crate::pipelines::utils::{pad_batch, pad_token_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiniLmSize {
    /// all-MiniLM-L6-v2: 6 layers, 384 dims.
    #[default]
    L6,
    /// all-MiniLM-L12-v2: 12 layers, 384 dims.
    L12,
}

impl MiniLmSize {
    pub fn repo_id(&self) -> &'static str {
        match self {
            MiniLmSize::L6 => "sentence-transformers/all-MiniLM-L6-v2",
            MiniLmSize::L12 => "sentence-transformers/all-MiniLM-L12-v2",
        }
    }

    /// `max_seq_length` from the checkpoint's sentence_bert_config.json.
    pub fn max_seq_length(&self) -> usize {
        match self {
            MiniLmSize::L6 => 256,
            MiniLmSize::L12 => 128,
        }
    }
}

impl fmt::Display for MiniLmSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiniLmSize::L6 => write!(f, "l6"),
            MiniLmSize::L12 => write!(f, "l12"),
        }
    }
}

impl FromStr for MiniLmSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l6" => Ok(MiniLmSize::L6),
            "l12" => Ok(MiniLmSize::L12),
            other => Err(format!(
                "unknown embedding model '{other}', expected 'l6' or 'l12'"
            )),
        }
    }
}

pub struct SentenceMiniLmModel {
    model: BertModel,
    device: Device,
    hidden_size: usize,
}

impl SentenceMiniLmModel {
    pub fn new(files: &CheckpointFiles, device: Device) -> Result<Self> {
        let config: Config = serde_json::from_str(&files.read_config()?)?;
        let vb = files.var_builder(&device)?;
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            hidden_size: config.hidden_size,
        })
    }

    pub fn embed_batch(&self, tokenizer: &Tokenizer, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| PipelineError::Tokenization(format!("Tokenization failed: {e}")))?;

        let (all_token_ids, all_attention_masks, max_len) =
            pad_batch(&encodings, pad_token_id(tokenizer));

        let input_ids = Tensor::from_vec(all_token_ids, (texts.len(), max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(all_attention_masks, (texts.len(), max_len), &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [batch, seq_len, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = mean_pool(&hidden, &attention_mask)?;
        let normalized = l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}

/// Average token vectors, counting only positions where the mask is set.
pub(crate) fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = (mask.sum(1)? + 1e-9)?;
    summed.broadcast_div(&counts)
}

pub(crate) fn l2_normalize(t: &Tensor) -> candle_core::Result<Tensor> {
    let norm = (t.sqr()?.sum_keepdim(1)?.sqrt()? + 1e-12)?;
    t.broadcast_div(&norm)
}

impl EmbeddingModel for SentenceMiniLmModel {
    type Options = MiniLmSize;

    fn repo_id(options: &Self::Options) -> &'static str {
        options.repo_id()
    }

    fn load(_options: &Self::Options, files: &CheckpointFiles, device: Device) -> Result<Self> {
        SentenceMiniLmModel::new(files, device)
    }

    fn configure_tokenizer(options: &Self::Options, tokenizer: &mut Tokenizer) -> Result<()> {
        // The hub tokenizer pads every input to a fixed width; batches are padded by hand instead.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_seq_length(),
                ..Default::default()
            }))
            .map_err(|e| PipelineError::Tokenization(format!("Invalid truncation settings: {e}")))?;
        Ok(())
    }

    fn embed_batch(&self, tokenizer: &Tokenizer, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        SentenceMiniLmModel::embed_batch(self, tokenizer, texts)
    }

    fn dimension(&self) -> usize {
        self.hidden_size
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
