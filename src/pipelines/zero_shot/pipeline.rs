use tokenizers::Tokenizer;

use super::model::ZeroShotClassificationModel;
use super::scoring;
use crate::core::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub score: f32,
}

pub struct ZeroShotClassificationPipeline<M: ZeroShotClassificationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) hypothesis_template: String,
}

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipeline<M> {
    /// Classify with normalized probabilities for single-label classification (probabilities sum to 1).
    ///
    /// With a single candidate the score is that label's entailment probability instead.
    pub fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<ClassificationResult>> {
        if candidate_labels.is_empty() {
            return Ok(vec![]);
        }
        let logits = self.logits(text, candidate_labels)?;
        let entailment = self.model.entailment_index();
        let scores = if candidate_labels.len() == 1 {
            scoring::independent_scores(&logits, entailment)
        } else {
            scoring::competing_scores(&logits, entailment)
        };
        Ok(scoring::rank(candidate_labels, scores))
    }

    /// Classify with raw entailment probabilities for multi-label classification.
    pub fn classify_multi_label(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<ClassificationResult>> {
        if candidate_labels.is_empty() {
            return Ok(vec![]);
        }
        let logits = self.logits(text, candidate_labels)?;
        let scores = scoring::independent_scores(&logits, self.model.entailment_index());
        Ok(scoring::rank(candidate_labels, scores))
    }

    pub fn hypothesis_template(&self) -> &str {
        &self.hypothesis_template
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }

    fn logits(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<Vec<f32>>> {
        let hypotheses: Vec<String> = candidate_labels
            .iter()
            .map(|label| self.hypothesis_template.replace("{}", label))
            .collect();
        self.model.pair_logits(&self.tokenizer, text, &hypotheses)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use candle_core::Device;

    use super::*;
    use crate::core::PipelineError;
    use crate::loaders::CheckpointFiles;
    use crate::pipelines::utils::word_level_tokenizer;
    use crate::pipelines::zero_shot::DEFAULT_HYPOTHESIS_TEMPLATE;

    /// Two-class NLI stand-in: column 0 is entailment, column 1 contradiction.
    struct ScriptedNli {
        logits: HashMap<String, [f32; 2]>,
        seen: Mutex<Vec<String>>,
        device: Device,
    }

    impl ScriptedNli {
        fn new(logits: &[(&str, [f32; 2])]) -> Self {
            Self {
                logits: logits
                    .iter()
                    .map(|(hypothesis, row)| (hypothesis.to_string(), *row))
                    .collect(),
                seen: Mutex::new(vec![]),
                device: Device::Cpu,
            }
        }
    }

    impl ZeroShotClassificationModel for ScriptedNli {
        type Options = String;

        fn repo_id(_options: &Self::Options) -> &'static str {
            "scripted/nli"
        }

        fn load(_options: &Self::Options, _files: &CheckpointFiles, _device: Device) -> Result<Self> {
            Err(PipelineError::Unexpected("scripted model has no weights".to_string()))
        }

        fn configure_tokenizer(&self, _tokenizer: &mut Tokenizer) -> Result<()> {
            Ok(())
        }

        fn pair_logits(
            &self,
            _tokenizer: &Tokenizer,
            _premise: &str,
            hypotheses: &[String],
        ) -> Result<Vec<Vec<f32>>> {
            self.seen.lock().unwrap().extend(hypotheses.iter().cloned());
            Ok(hypotheses
                .iter()
                .map(|h| self.logits.get(h).copied().unwrap_or([0.0, 0.0]).to_vec())
                .collect())
        }

        fn entailment_index(&self) -> usize {
            0
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    fn pipeline(model: ScriptedNli, template: &str) -> ZeroShotClassificationPipeline<ScriptedNli> {
        ZeroShotClassificationPipeline {
            model,
            tokenizer: word_level_tokenizer(&[]),
            hypothesis_template: template.to_string(),
        }
    }

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    #[test]
    fn single_label_scores_its_own_entailment() {
        let model = ScriptedNli::new(&[("This example is food.", [2.0, 0.5])]);
        let pipeline = pipeline(model, DEFAULT_HYPOTHESIS_TEMPLATE);

        let results = pipeline.classify("I love pizza", &["food"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "food");
        assert!((results[0].score - sigmoid(1.5)).abs() < 1e-5);
    }

    #[test]
    fn several_labels_compete_for_probability_mass() {
        let model = ScriptedNli::new(&[
            ("This example is politics.", [-1.0, 3.0]),
            ("This example is food.", [2.0, 0.0]),
            ("This example is sports.", [0.0, 0.0]),
        ]);
        let pipeline = pipeline(model, DEFAULT_HYPOTHESIS_TEMPLATE);

        let results = pipeline
            .classify("I love pizza", &["politics", "food", "sports"])
            .unwrap();
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["food", "sports", "politics"]);

        let total: f32 = results.iter().map(|r| r.score).sum();
        assert!((total - 1.0).abs() < 1e-5);

        let expected = 2f32.exp() / (2f32.exp() + 1.0 + (-1f32).exp());
        assert!((results[0].score - expected).abs() < 1e-5);
    }

    #[test]
    fn multi_label_scores_each_pair_on_its_own() {
        let model = ScriptedNli::new(&[
            ("This example is food.", [2.0, 0.0]),
            ("This example is italy.", [1.0, 0.0]),
        ]);
        let pipeline = pipeline(model, DEFAULT_HYPOTHESIS_TEMPLATE);

        let results = pipeline
            .classify_multi_label("Neapolitan pizza", &["italy", "food"])
            .unwrap();
        assert_eq!(results[0].label, "food");
        assert!((results[0].score - sigmoid(2.0)).abs() < 1e-5);
        assert!((results[1].score - sigmoid(1.0)).abs() < 1e-5);
    }

    #[test]
    fn labels_are_slotted_into_the_template() {
        let pipeline = pipeline(ScriptedNli::new(&[]), "Topic: {}");

        pipeline.classify("text", &["food", "politics"]).unwrap();
        let seen = pipeline.model.seen.lock().unwrap().clone();
        assert_eq!(seen, ["Topic: food", "Topic: politics"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let pipeline = pipeline(ScriptedNli::new(&[]), DEFAULT_HYPOTHESIS_TEMPLATE);

        let results = pipeline.classify("text", &["b", "a", "c"]).unwrap();
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["b", "a", "c"]);
    }

    #[test]
    fn no_labels_skips_the_model() {
        let pipeline = pipeline(ScriptedNli::new(&[]), DEFAULT_HYPOTHESIS_TEMPLATE);

        assert!(pipeline.classify("text", &[]).unwrap().is_empty());
        assert!(pipeline.model.seen.lock().unwrap().is_empty());
    }
}
