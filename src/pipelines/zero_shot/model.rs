use candle_core::Device;
use tokenizers::Tokenizer;

use crate::core::Result;
use crate::loaders::CheckpointFiles;

/// A sequence-pair classifier trained on natural language inference.
///
/// The pipeline turns every candidate label into a hypothesis and asks the
/// model how strongly the text entails it.
pub trait ZeroShotClassificationModel {
    type Options: std::fmt::Debug + std::fmt::Display + Clone;

    /// Hub repository holding the checkpoint for `options`.
    fn repo_id(options: &Self::Options) -> &'static str;

    fn load(options: &Self::Options, files: &CheckpointFiles, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Adjust the hub tokenizer so every (premise, hypothesis) pair fits the model.
    fn configure_tokenizer(&self, tokenizer: &mut Tokenizer) -> Result<()>;

    /// Raw NLI logits, one row per hypothesis and one column per NLI class.
    fn pair_logits(
        &self,
        tokenizer: &Tokenizer,
        premise: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Vec<f32>>>;

    /// Column of [`Self::pair_logits`] holding the entailment class.
    fn entailment_index(&self) -> usize;

    fn device(&self) -> &Device;
}
