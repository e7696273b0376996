//! Turning NLI logits into label rankings.

use super::pipeline::ClassificationResult;

/// Column holding the contradiction class, given where entailment sits.
pub(crate) fn contradiction_index(entailment_index: usize, num_classes: usize) -> usize {
    if entailment_index == 0 {
        num_classes.saturating_sub(1)
    } else {
        0
    }
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Each label scored on its own: entailment against contradiction for that pair.
pub(crate) fn independent_scores(logits: &[Vec<f32>], entailment_index: usize) -> Vec<f32> {
    logits
        .iter()
        .map(|row| {
            let contradiction = contradiction_index(entailment_index, row.len());
            softmax(&[row[contradiction], row[entailment_index]])[1]
        })
        .collect()
}

/// Labels compete with each other: softmax of the entailment logits across all pairs.
pub(crate) fn competing_scores(logits: &[Vec<f32>], entailment_index: usize) -> Vec<f32> {
    let entailment: Vec<f32> = logits.iter().map(|row| row[entailment_index]).collect();
    softmax(&entailment)
}

/// Pair labels with scores, best first. Equal scores keep their input order.
pub(crate) fn rank(candidate_labels: &[&str], scores: Vec<f32>) -> Vec<ClassificationResult> {
    let mut results: Vec<ClassificationResult> = candidate_labels
        .iter()
        .zip(scores)
        .map(|(&label, score)| ClassificationResult {
            label: label.to_string(),
            score,
        })
        .collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}
