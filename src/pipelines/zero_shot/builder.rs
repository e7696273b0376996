use std::path::PathBuf;

use super::model::ZeroShotClassificationModel;
use super::pipeline::ZeroShotClassificationPipeline;
use super::DEFAULT_HYPOTHESIS_TEMPLATE;
use crate::core::{PipelineError, Result};
use crate::loaders::{CheckpointLoader, TokenizerLoader};
use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};

pub struct ZeroShotClassificationPipelineBuilder<M: ZeroShotClassificationModel> {
    options: M::Options,
    device_request: DeviceRequest,
    hypothesis_template: String,
    cache_dir: Option<PathBuf>,
}

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
            cache_dir: None,
        }
    }

    /// Sentence each label is slotted into; `{}` marks the label position.
    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }

    pub fn cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub async fn build(self) -> Result<ZeroShotClassificationPipeline<M>> {
        if !self.hypothesis_template.contains("{}") {
            return Err(PipelineError::InvalidInput(format!(
                "hypothesis template '{}' has no '{{}}' placeholder",
                self.hypothesis_template
            )));
        }

        let device = self.device_request.resolve()?;
        let repo_id = M::repo_id(&self.options);
        tracing::info!(checkpoint = repo_id, device = ?device.location(), "loading zero-shot classifier");

        let files = CheckpointLoader::new(repo_id)
            .with_cache_dir(self.cache_dir.clone())
            .load()
            .await?;
        let mut tokenizer = TokenizerLoader::new(repo_id, "tokenizer.json")
            .with_cache_dir(self.cache_dir)
            .load()
            .await?;
        let model = M::load(&self.options, &files, device)?;
        model.configure_tokenizer(&mut tokenizer)?;

        tracing::info!(checkpoint = repo_id, "zero-shot classifier ready");
        Ok(ZeroShotClassificationPipeline {
            model,
            tokenizer,
            hypothesis_template: self.hypothesis_template,
        })
    }
}

impl<M: ZeroShotClassificationModel> DeviceSelectable for ZeroShotClassificationPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl ZeroShotClassificationPipelineBuilder<crate::models::ZeroShotModernBertModel> {
    pub fn modernbert(size: crate::models::ZeroShotModernBertSize) -> Self {
        Self::new(size)
    }
}
