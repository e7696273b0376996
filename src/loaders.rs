//! Checkpoint and tokenizer loading from the Hugging Face Hub.
//!
//! - [`HfLoader`] - fetches a single file from a model repository, with retry
//! - [`TokenizerLoader`] - loads `tokenizer.json`
//! - [`CheckpointLoader`] - resolves `config.json` plus the weight file of a checkpoint
//!
//! Files land in the hf-hub cache, so only the first start of the process
//! touches the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::tokio::{Api, ApiBuilder};
use tokenizers::Tokenizer;

use crate::core::{PipelineError, Result};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
    pub cache_dir: Option<PathBuf>,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
            cache_dir: None,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub async fn load(&self) -> Result<PathBuf> {
        let hf_api = build_api(self.cache_dir.as_deref())?;
        let hf_repo = hf_api.model(self.repo.clone());

        let mut attempt = 0;
        loop {
            match hf_repo.get(self.filename.as_str()).await {
                Ok(path) => return Ok(path),
                Err(e) => {
                    // Concurrent downloads of the same file contend for the cache lock.
                    if e.to_string().contains("Lock acquisition failed") && attempt + 1 < MAX_RETRIES
                    {
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        tracing::debug!(
                            repo = %self.repo,
                            file = %self.filename,
                            ?wait_time,
                            "hub cache locked, retrying"
                        );
                        tokio::time::sleep(wait_time).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn build_api(cache_dir: Option<&Path>) -> Result<Api> {
    let mut builder = ApiBuilder::new().with_chunk_size(None);
    if let Some(dir) = cache_dir {
        builder = builder.with_cache_dir(dir.to_path_buf());
    }
    Ok(builder.build()?)
}

#[derive(Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
}

impl TokenizerLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.tokenizer_file_loader = self.tokenizer_file_loader.with_cache_dir(cache_dir);
        self
    }

    pub async fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = self.tokenizer_file_loader.load().await?;
        let path_str = tokenizer_file_path.display().to_string();

        Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{path_str}': {e}"
            ))
        })
    }
}

/// Local paths of a downloaded checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl CheckpointFiles {
    pub fn read_config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.config)?)
    }

    /// Memory-map safetensors weights, or read a pickled PyTorch file.
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let vb = if self
            .weights
            .extension()
            .is_some_and(|ext| ext == "safetensors")
        {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&self.weights], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(&self.weights, DType::F32, device)?
        };
        Ok(vb)
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointLoader {
    pub repo: String,
    pub cache_dir: Option<PathBuf>,
}

impl CheckpointLoader {
    pub fn new(repo: &str) -> Self {
        Self {
            repo: repo.into(),
            cache_dir: None,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    fn file(&self, filename: &str) -> HfLoader {
        HfLoader::new(&self.repo, filename).with_cache_dir(self.cache_dir.clone())
    }

    pub async fn load(&self) -> Result<CheckpointFiles> {
        let config = self.file("config.json").load().await?;
        let weights = match self.file("model.safetensors").load().await {
            Ok(path) => path,
            Err(safetensors_err) => {
                tracing::debug!(repo = %self.repo, error = %safetensors_err, "no safetensors weights, trying pytorch_model.bin");
                self.file("pytorch_model.bin").load().await.map_err(|e| {
                    PipelineError::Download(format!(
                        "Model weights not found in repo {}. Expected `model.safetensors` or `pytorch_model.bin`: {e}",
                        self.repo
                    ))
                })?
            }
        };
        Ok(CheckpointFiles { config, weights })
    }
}
