use candle_core::Device;
use tokenizers::Tokenizer;

use crate::core::Result;
use crate::loaders::CheckpointFiles;

/// Trait for sentence embedding models used in the embedding pipeline.
pub trait EmbeddingModel {
    type Options: std::fmt::Debug + std::fmt::Display + Clone;

    fn repo_id(options: &Self::Options) -> &'static str;

    fn load(options: &Self::Options, files: &CheckpointFiles, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Adjust the hub tokenizer (truncation, padding) to how the model was trained.
    fn configure_tokenizer(options: &Self::Options, tokenizer: &mut Tokenizer) -> Result<()>;

    /// One vector per text, in input order.
    fn embed_batch(&self, tokenizer: &Tokenizer, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this model produces.
    fn dimension(&self) -> usize;

    fn device(&self) -> &Device;
}
