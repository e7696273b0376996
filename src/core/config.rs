use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::core::{PipelineError, Result};
use crate::models::{MiniLmSize, ZeroShotModernBertSize};
use crate::pipelines::utils::DeviceRequest;
use crate::pipelines::zero_shot::DEFAULT_HYPOTHESIS_TEMPLATE;

/// Process configuration, read from the command line with environment fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "inference-service", version, about)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    #[arg(long, env = "INFERENCE_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Zero-shot classifier checkpoint (`base` or `large`).
    #[arg(long, env = "CLASSIFIER_MODEL", default_value = "base")]
    pub classifier_model: ZeroShotModernBertSize,

    /// Device for the classifier: `auto`, `cpu` or `cuda:<index>`.
    #[arg(long, env = "CLASSIFIER_DEVICE", default_value = "auto")]
    pub classifier_device: DeviceRequest,

    /// NLI hypothesis; `{}` is replaced by each candidate label.
    #[arg(long, env = "HYPOTHESIS_TEMPLATE", default_value = DEFAULT_HYPOTHESIS_TEMPLATE)]
    pub hypothesis_template: String,

    /// Sentence embedding checkpoint (`l6` or `l12`).
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "l6")]
    pub embedding_model: MiniLmSize,

    /// Device for the embedder: `auto`, `cpu` or `cuda:<index>`.
    #[arg(long, env = "EMBEDDING_DEVICE", default_value = "auto")]
    pub embedding_device: DeviceRequest,

    /// Number of sentences per forward pass.
    #[arg(long, env = "EMBEDDING_BATCH_SIZE", default_value_t = 32)]
    pub embedding_batch_size: usize,

    /// Override for the Hugging Face cache directory.
    #[arg(long, env = "HF_CACHE_DIR")]
    pub hf_cache_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reject settings that would only fail later, once models are loaded.
    pub fn validate(&self) -> Result<()> {
        if !self.hypothesis_template.contains("{}") {
            return Err(PipelineError::InvalidInput(format!(
                "hypothesis template '{}' must contain a '{{}}' placeholder",
                self.hypothesis_template
            )));
        }
        if self.embedding_batch_size == 0 {
            return Err(PipelineError::InvalidInput(
                "embedding batch size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 8] = [
        "INFERENCE_BIND",
        "CLASSIFIER_MODEL",
        "CLASSIFIER_DEVICE",
        "HYPOTHESIS_TEMPLATE",
        "EMBEDDING_MODEL",
        "EMBEDDING_DEVICE",
        "EMBEDDING_BATCH_SIZE",
        "HF_CACHE_DIR",
    ];

    /// Parse `args` with none of the config variables set in the environment.
    fn parse(args: &[&str]) -> ServerConfig {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        let mut argv = vec!["inference-service"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = parse(&[]);

        assert_eq!(config.bind, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.classifier_model, ZeroShotModernBertSize::Base);
        assert!(matches!(config.classifier_device, DeviceRequest::Default));
        assert_eq!(config.hypothesis_template, DEFAULT_HYPOTHESIS_TEMPLATE);
        assert_eq!(config.embedding_model, MiniLmSize::L6);
        assert!(matches!(config.embedding_device, DeviceRequest::Default));
        assert_eq!(config.embedding_batch_size, 32);
        assert!(config.hf_cache_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--bind",
            "0.0.0.0:9000",
            "--classifier-model",
            "large",
            "--embedding-model",
            "l12",
            "--embedding-batch-size",
            "8",
            "--hf-cache-dir",
            "/tmp/hf",
        ]);
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.classifier_model, ZeroShotModernBertSize::Large);
        assert_eq!(config.embedding_model, MiniLmSize::L12);
        assert_eq!(config.embedding_batch_size, 8);
        assert_eq!(config.hf_cache_dir, Some(PathBuf::from("/tmp/hf")));
    }

    #[test]
    fn device_flags_are_parsed() {
        let config = parse(&["--classifier-device", "cuda:1", "--embedding-device", "cpu"]);
        assert!(matches!(config.classifier_device, DeviceRequest::Cuda(1)));
        assert!(matches!(config.embedding_device, DeviceRequest::Cpu));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let config = parse(&["--hypothesis-template", "This example is about things."]);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = parse(&["--embedding-batch-size", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        let result = ServerConfig::try_parse_from(["inference-service", "--embedding-model", "xl"]);
        assert!(result.is_err());
    }
}
