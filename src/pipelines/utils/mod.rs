use std::fmt;
use std::str::FromStr;

use candle_core::Device;
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};

use crate::core::{PipelineError, Result};

/// Selects CUDA device 0 when available and otherwise falls back to CPU.
pub fn load_device() -> Result<Device> {
    Device::cuda_if_available(0).map_err(|e| PipelineError::Device(e.to_string()))
}

/// Request for a specific device, used by pipeline builders.
#[derive(Debug, Clone, Default)]
pub enum DeviceRequest {
    /// Use CUDA if available, otherwise CPU.
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Select a specific CUDA device by index. Fails if it cannot be opened.
    Cuda(usize),
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Default => load_device(),
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i)
                .map_err(|e| PipelineError::Device(format!("CUDA device {i} unavailable: {e}"))),
            DeviceRequest::Explicit(d) => Ok(d),
        }
    }
}

impl FromStr for DeviceRequest {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "default" => Ok(DeviceRequest::Default),
            "cpu" => Ok(DeviceRequest::Cpu),
            "cuda" => Ok(DeviceRequest::Cuda(0)),
            other => match other.strip_prefix("cuda:") {
                Some(index) => index
                    .parse()
                    .map(DeviceRequest::Cuda)
                    .map_err(|_| format!("invalid CUDA device index '{index}'")),
                None => Err(format!(
                    "unknown device '{s}', expected 'auto', 'cpu' or 'cuda:<index>'"
                )),
            },
        }
    }
}

impl fmt::Display for DeviceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRequest::Default => write!(f, "auto"),
            DeviceRequest::Cpu => write!(f, "cpu"),
            DeviceRequest::Cuda(i) => write!(f, "cuda:{i}"),
            DeviceRequest::Explicit(d) => write!(f, "{:?}", d.location()),
        }
    }
}

/// Trait providing convenience methods for pipeline builders to select a device.
pub trait DeviceSelectable: Sized {
    /// Returns a mutable reference to the builder's internal [`DeviceRequest`].
    fn device_request_mut(&mut self) -> &mut DeviceRequest;

    /// Force the pipeline to run on CPU.
    fn cpu(mut self) -> Self {
        *self.device_request_mut() = DeviceRequest::Cpu;
        self
    }

    /// Select a specific CUDA device by index.
    fn cuda_device(mut self, index: usize) -> Self {
        *self.device_request_mut() = DeviceRequest::Cuda(index);
        self
    }

    /// Provide an explicit [`Device`].
    fn device(mut self, device: Device) -> Self {
        *self.device_request_mut() = DeviceRequest::Explicit(device);
        self
    }

    /// Replace the device request wholesale, e.g. with one parsed from configuration.
    fn device_request(mut self, request: DeviceRequest) -> Self {
        *self.device_request_mut() = request;
        self
    }
}

/// Pad each row of token ids (and its attention mask) to the longest row.
///
/// Returns the flattened ids, the flattened mask, and the padded length.
pub(crate) fn pad_batch(
    encodings: &[tokenizers::Encoding],
    pad_token_id: u32,
) -> (Vec<u32>, Vec<u32>, usize) {
    let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

    let mut all_token_ids: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
    let mut all_attention_masks: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);

    for encoding in encodings {
        let mut token_ids = encoding.get_ids().to_vec();
        let mut attention_mask = encoding.get_attention_mask().to_vec();
        token_ids.resize(max_len, pad_token_id);
        attention_mask.resize(max_len, 0);
        all_token_ids.extend(token_ids);
        all_attention_masks.extend(attention_mask);
    }

    (all_token_ids, all_attention_masks, max_len)
}

/// Resolve the pad token id, preferring the tokenizer's padding configuration.
pub(crate) fn pad_token_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| tokenizer.token_to_id("<pad>"))
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .unwrap_or(0)
}

/// Cap encoded (premise, hypothesis) pairs at `max_length` tokens.
///
/// Only the premise is shortened; a hypothesis is never cut.
pub(crate) fn truncate_premise(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            strategy: TruncationStrategy::OnlyFirst,
            ..Default::default()
        }))
        .map_err(|e| PipelineError::Tokenization(format!("Invalid truncation settings: {e}")))?;
    Ok(())
}

/// Whitespace word-level tokenizer over `words`, with `[UNK]` = 0 and `[PAD]` = 1.
#[cfg(test)]
pub(crate) fn word_level_tokenizer(words: &[&str]) -> Tokenizer {
    use std::str::FromStr;

    let mut vocab = serde_json::Map::new();
    vocab.insert("[UNK]".to_string(), 0.into());
    vocab.insert("[PAD]".to_string(), 1.into());
    for (i, word) in words.iter().enumerate() {
        vocab.insert(word.to_string(), (i + 2).into());
    }
    let json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
    });
    Tokenizer::from_str(&json.to_string()).unwrap()
}
