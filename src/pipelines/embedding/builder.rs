use std::path::PathBuf;

use super::model::EmbeddingModel;
use super::pipeline::EmbeddingPipeline;
use super::DEFAULT_BATCH_SIZE;
use crate::core::{PipelineError, Result};
use crate::loaders::{CheckpointLoader, TokenizerLoader};
use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};

pub struct EmbeddingPipelineBuilder<M: EmbeddingModel> {
    options: M::Options,
    device_request: DeviceRequest,
    batch_size: usize,
    cache_dir: Option<PathBuf>,
}

impl<M: EmbeddingModel> EmbeddingPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_dir: None,
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub async fn build(self) -> Result<EmbeddingPipeline<M>> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidInput(
                "embedding batch size must be greater than zero".to_string(),
            ));
        }

        let device = self.device_request.resolve()?;
        let repo_id = M::repo_id(&self.options);
        tracing::info!(checkpoint = repo_id, device = ?device.location(), "loading sentence embedder");

        let files = CheckpointLoader::new(repo_id)
            .with_cache_dir(self.cache_dir.clone())
            .load()
            .await?;
        let mut tokenizer = TokenizerLoader::new(repo_id, "tokenizer.json")
            .with_cache_dir(self.cache_dir)
            .load()
            .await?;
        M::configure_tokenizer(&self.options, &mut tokenizer)?;
        let model = M::load(&self.options, &files, device)?;

        tracing::info!(
            checkpoint = repo_id,
            dimension = model.dimension(),
            "sentence embedder ready"
        );
        Ok(EmbeddingPipeline {
            model,
            tokenizer,
            batch_size: self.batch_size,
        })
    }
}

impl<M: EmbeddingModel> DeviceSelectable for EmbeddingPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl EmbeddingPipelineBuilder<crate::models::SentenceMiniLmModel> {
    pub fn minilm(size: crate::models::MiniLmSize) -> Self {
        Self::new(size)
    }
}
