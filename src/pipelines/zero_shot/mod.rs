//! Zero-shot text classification.
//!
//! Candidate labels are not known to the model in advance. Each one is slotted
//! into a hypothesis (by default `"This example is {}."`) and an NLI model
//! scores how strongly the input text entails it.
//!
//! ```rust,no_run
//! use inference_service::pipelines::zero_shot::*;
//!
//! # async fn run() -> inference_service::core::Result<()> {
//! let pipeline = ZeroShotClassificationPipelineBuilder::modernbert(ZeroShotModernBertSize::Base)
//!     .cpu()
//!     .build()
//!     .await?;
//!
//! let results = pipeline.classify("I love pizza", &["food", "politics"])?;
//! println!("{}: {:.3}", results[0].label, results[0].score);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;
mod scoring;

pub use builder::ZeroShotClassificationPipelineBuilder;
pub use model::ZeroShotClassificationModel;
pub use pipeline::{ClassificationResult, ZeroShotClassificationPipeline};

pub use crate::models::{ZeroShotModernBertModel, ZeroShotModernBertSize};
pub use crate::pipelines::utils::DeviceSelectable;

pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";
