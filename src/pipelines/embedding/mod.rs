//! Sentence embedding pipeline for generating dense vector representations of text.
//!
//! ## Main Types
//!
//! - [`EmbeddingPipeline`] - High-level interface for sentence embedding
//! - [`EmbeddingPipelineBuilder`] - Builder pattern for pipeline configuration
//! - [`EmbeddingModel`] - Trait for embedding model implementations
//! - [`SentenceMiniLmModel`] - MiniLM sentence-transformers implementation
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use inference_service::pipelines::embedding::*;
//!
//! # async fn run() -> inference_service::core::Result<()> {
//! let pipeline = EmbeddingPipelineBuilder::minilm(MiniLmSize::L6)
//!     .build()
//!     .await?;
//!
//! let embeddings = pipeline.embed_batch(&["Hello world", "How are you?"])?;
//! println!("Generated {} embeddings of size {}", embeddings.len(), pipeline.dimension());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;

pub use builder::EmbeddingPipelineBuilder;
pub use model::EmbeddingModel;
pub use pipeline::EmbeddingPipeline;

pub use crate::models::{MiniLmSize, SentenceMiniLmModel};
pub use crate::pipelines::utils::DeviceSelectable;

/// Sentences per forward pass unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 32;
