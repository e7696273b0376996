// Pipeline modules organized by functionality
pub mod embedding;
pub mod utils;
pub mod zero_shot;

use crate::core::{PipelineError, Result};

pub use embedding::{EmbeddingModel, EmbeddingPipeline, EmbeddingPipelineBuilder};
pub use zero_shot::{
    ClassificationResult, ZeroShotClassificationModel, ZeroShotClassificationPipeline,
    ZeroShotClassificationPipelineBuilder,
};

/// Anything that can rank caller-supplied labels against a text.
///
/// This is the boundary the HTTP layer talks to, so the model behind it can be
/// swapped without touching request handling.
pub trait ZeroShotClassifier: Send + Sync {
    /// All candidate labels with scores, best first.
    fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<ClassificationResult>>;

    /// The single best label. Always one of `candidate_labels`.
    fn top_label(&self, text: &str, candidate_labels: &[&str]) -> Result<String> {
        if candidate_labels.is_empty() {
            return Err(PipelineError::InvalidInput(
                "at least one candidate label is required".to_string(),
            ));
        }
        self.classify(text, candidate_labels)?
            .into_iter()
            .next()
            .map(|result| result.label)
            .ok_or_else(|| PipelineError::Unexpected("classifier returned no labels".to_string()))
    }
}

/// Anything that maps sentences to fixed-length vectors.
pub trait SentenceEmbedder: Send + Sync {
    /// One vector per sentence, in input order, each of length [`Self::dimension`].
    fn embed_batch(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;
}

impl<M> ZeroShotClassifier for ZeroShotClassificationPipeline<M>
where
    M: ZeroShotClassificationModel + Send + Sync,
{
    fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<ClassificationResult>> {
        ZeroShotClassificationPipeline::classify(self, text, candidate_labels)
    }
}

impl<M> SentenceEmbedder for EmbeddingPipeline<M>
where
    M: EmbeddingModel + Send + Sync,
{
    fn embed_batch(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>> {
        EmbeddingPipeline::embed_batch(self, sentences)
    }

    fn dimension(&self) -> usize {
        EmbeddingPipeline::dimension(self)
    }
}
