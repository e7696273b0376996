use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::pipelines::SentenceEmbedder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub sentences: Vec<String>,
}

/// `POST /embed`, bound to its own embedder.
pub fn router(embedder: Arc<dyn SentenceEmbedder>) -> Router {
    Router::new()
        .route("/embed", post(embed_sentences))
        .with_state(embedder)
}

/// Responds with one vector per input sentence, in input order.
async fn embed_sentences(
    State(embedder): State<Arc<dyn SentenceEmbedder>>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<Vec<Vec<f32>>>, ApiError> {
    let Json(EmbedRequest { sentences }) = payload?;
    if sentences.is_empty() {
        return Ok(Json(vec![]));
    }

    tracing::debug!(sentences = sentences.len(), "embed request");

    let embeddings = tokio::task::spawn_blocking(move || {
        let sentences: Vec<&str> = sentences.iter().map(String::as_str).collect();
        embedder.embed_batch(&sentences)
    })
    .await??;

    Ok(Json(embeddings))
}
