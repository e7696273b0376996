//! HTTP surface: `POST /classify` and `POST /embed`.
//!
//! Both models are loaded once at startup, wrapped in an [`AppContext`], and
//! handed to their route group by shared reference. The route groups do not
//! share state with each other.

pub mod classify;
pub mod embed;
pub mod error;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::pipelines::{SentenceEmbedder, ZeroShotClassifier};

pub use classify::ClassifyRequest;
pub use embed::EmbedRequest;
pub use error::{ApiError, ErrorResponse};

/// Everything the routes need, built once at process start.
#[derive(Clone)]
pub struct AppContext {
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub embedder: Arc<dyn SentenceEmbedder>,
}

impl AppContext {
    pub fn new(
        classifier: impl ZeroShotClassifier + 'static,
        embedder: impl SentenceEmbedder + 'static,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            embedder: Arc::new(embedder),
        }
    }
}

pub fn app(ctx: AppContext) -> Router {
    Router::new()
        .merge(classify::router(ctx.classifier))
        .merge(embed::router(ctx.embedder))
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, ctx: AppContext) -> std::io::Result<()> {
    axum::serve(listener, app(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
