pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod server;

pub use crate::core::{PipelineError, Result, ServerConfig};

pub use models::{MiniLmSize, SentenceMiniLmModel, ZeroShotModernBertModel, ZeroShotModernBertSize};
pub use pipelines::{SentenceEmbedder, ZeroShotClassifier};
pub use server::AppContext;
