/*
Zero-Shot ModernBERT

https://huggingface.co/MoritzLaurer/ModernBERT-base-zeroshot-v2.0
https://huggingface.co/MoritzLaurer/ModernBERT-large-zeroshot-v2.0

Both checkpoints are ModernBertForSequenceClassification heads trained on NLI
with two classes:

  "id2label": { "0": "entailment", "1": "not_entailment" }
*/

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use candle_core::{Device, Tensor};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config, ModernBertForSequenceClassification,
};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::core::{PipelineError, Result};
use crate::loaders::CheckpointFiles;
use crate::pipelines::utils::{pad_batch, pad_token_id, truncate_premise};
use crate::pipelines::zero_shot::ZeroShotClassificationModel;

/// Available sizes of the zero-shot ModernBERT model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroShotModernBertSize {
    /// ~150M parameters.
    #[default]
    Base,
    /// ~400M parameters.
    Large,
}

impl ZeroShotModernBertSize {
    pub fn repo_id(&self) -> &'static str {
        match self {
            ZeroShotModernBertSize::Base => "MoritzLaurer/ModernBERT-base-zeroshot-v2.0",
            ZeroShotModernBertSize::Large => "MoritzLaurer/ModernBERT-large-zeroshot-v2.0",
        }
    }
}

impl fmt::Display for ZeroShotModernBertSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZeroShotModernBertSize::Base => "base",
            ZeroShotModernBertSize::Large => "large",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ZeroShotModernBertSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(ZeroShotModernBertSize::Base),
            "large" => Ok(ZeroShotModernBertSize::Large),
            other => Err(format!(
                "unknown classifier size '{other}', expected 'base' or 'large'"
            )),
        }
    }
}

#[derive(Clone)]
pub struct ZeroShotModernBertModel {
    model: ModernBertForSequenceClassification,
    device: Device,
    entailment_id: usize,
    max_position_embeddings: usize,
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
    classifier_pooling: Option<ClassifierPooling>,
}

impl ZeroShotModernBertModel {
    pub fn new(files: &CheckpointFiles, device: Device) -> Result<Self> {
        let config_str = files.read_config()?;
        let mut config: Config = serde_json::from_str(&config_str)?;
        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;

        let num_labels = class_cfg.label2id.len().max(class_cfg.id2label.len());
        if num_labels < 2 {
            return Err(PipelineError::Unexpected(format!(
                "checkpoint config declares {num_labels} NLI classes, need at least 2"
            )));
        }
        let entailment_id = entailment_id(&class_cfg.label2id, num_labels);
        let max_position_embeddings = config.max_position_embeddings;

        // The head is sized from id2label; label2id is stringly typed on the candle side.
        config.classifier_config = Some(ClassifierConfig {
            id2label: class_cfg.id2label,
            label2id: class_cfg
                .label2id
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            classifier_pooling: class_cfg.classifier_pooling.unwrap_or_default(),
        });

        let vb = files.var_builder(&device)?;
        let model = ModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            entailment_id,
            max_position_embeddings,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn pair_logits(
        &self,
        tokenizer: &Tokenizer,
        premise: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        if hypotheses.is_empty() {
            return Ok(vec![]);
        }

        let mut encodings = Vec::with_capacity(hypotheses.len());
        for hypothesis in hypotheses {
            let encoding = tokenizer
                .encode((premise, hypothesis.as_str()), true)
                .map_err(|e| {
                    PipelineError::Tokenization(format!(
                        "Tokenization failed on '{}': {}",
                        premise.chars().take(50).collect::<String>(),
                        e
                    ))
                })?;
            encodings.push(encoding);
        }

        let (all_token_ids, all_attention_masks, max_len) =
            pad_batch(&encodings, pad_token_id(tokenizer));

        let input_ids = Tensor::from_vec(all_token_ids, (hypotheses.len(), max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(
            all_attention_masks,
            (hypotheses.len(), max_len),
            &self.device,
        )?;

        // [num_hypotheses, num_nli_classes]
        let logits = self.model.forward(&input_ids, &attention_mask)?;
        Ok(logits.to_vec2::<f32>()?)
    }
}

/// First class whose name starts with "entail"; the last class otherwise.
fn entailment_id(label2id: &HashMap<String, u32>, num_labels: usize) -> usize {
    label2id
        .iter()
        .find(|(label, _)| label.to_lowercase().starts_with("entail"))
        .map(|(_, &id)| id as usize)
        .unwrap_or(num_labels - 1)
}

impl ZeroShotClassificationModel for ZeroShotModernBertModel {
    type Options = ZeroShotModernBertSize;

    fn repo_id(options: &Self::Options) -> &'static str {
        options.repo_id()
    }

    fn load(_options: &Self::Options, files: &CheckpointFiles, device: Device) -> Result<Self> {
        ZeroShotModernBertModel::new(files, device)
    }

    // Positions past the rotary tables fail in the forward pass.
    fn configure_tokenizer(&self, tokenizer: &mut Tokenizer) -> Result<()> {
        truncate_premise(tokenizer, self.max_position_embeddings)
    }

    fn pair_logits(
        &self,
        tokenizer: &Tokenizer,
        premise: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        ZeroShotModernBertModel::pair_logits(self, tokenizer, premise, hypotheses)
    }

    fn entailment_index(&self) -> usize {
        self.entailment_id
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
