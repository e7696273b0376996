use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use inference_service::pipelines::embedding::EmbeddingPipelineBuilder;
use inference_service::pipelines::utils::DeviceSelectable;
use inference_service::pipelines::zero_shot::ZeroShotClassificationPipelineBuilder;
use inference_service::{server, AppContext, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    config.validate().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let classifier = ZeroShotClassificationPipelineBuilder::modernbert(config.classifier_model)
        .device_request(config.classifier_device.clone())
        .hypothesis_template(config.hypothesis_template.clone())
        .cache_dir(config.hf_cache_dir.clone())
        .build()
        .await
        .context("failed to load zero-shot classifier")?;

    let embedder = EmbeddingPipelineBuilder::minilm(config.embedding_model)
        .device_request(config.embedding_device.clone())
        .batch_size(config.embedding_batch_size)
        .cache_dir(config.hf_cache_dir.clone())
        .build()
        .await
        .context("failed to load sentence embedder")?;

    let ctx = AppContext::new(classifier, embedder);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "inference service listening");

    server::serve(listener, ctx).await?;
    Ok(())
}
