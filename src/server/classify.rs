use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::pipelines::ZeroShotClassifier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    pub candidate_labels: Vec<String>,
}

impl ClassifyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.candidate_labels.is_empty() {
            return Err(ApiError::Validation {
                field: "candidate_labels",
                message: "at least one candidate label is required".to_string(),
            });
        }
        Ok(())
    }
}

/// `POST /classify`, bound to its own classifier.
pub fn router(classifier: Arc<dyn ZeroShotClassifier>) -> Router {
    Router::new()
        .route("/classify", post(classify_text))
        .with_state(classifier)
}

/// Responds with the single best label as a bare JSON string.
async fn classify_text(
    State(classifier): State<Arc<dyn ZeroShotClassifier>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::debug!(
        text_len = request.text.len(),
        labels = request.candidate_labels.len(),
        "classify request"
    );

    let ClassifyRequest {
        text,
        candidate_labels,
    } = request;
    let label = tokio::task::spawn_blocking(move || {
        let labels: Vec<&str> = candidate_labels.iter().map(String::as_str).collect();
        classifier.top_label(&text, &labels)
    })
    .await??;

    Ok(Json(label))
}
