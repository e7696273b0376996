use tokenizers::Tokenizer;

use super::model::EmbeddingModel;
use crate::core::{PipelineError, Result};

pub struct EmbeddingPipeline<M: EmbeddingModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) batch_size: usize,
}

impl<M: EmbeddingModel> EmbeddingPipeline<M> {
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("model returned no embedding".to_string()))
    }

    /// Embed `texts` in chunks of the configured batch size.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let chunk_embeddings = self.model.embed_batch(&self.tokenizer, chunk)?;
            if chunk_embeddings.len() != chunk.len() {
                return Err(PipelineError::Unexpected(format!(
                    "model returned {} embeddings for {} texts",
                    chunk_embeddings.len(),
                    chunk.len()
                )));
            }
            embeddings.extend(chunk_embeddings);
        }
        Ok(embeddings)
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}
