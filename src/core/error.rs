//! Error types for the model and pipeline layers.
//!
//! All fallible library operations return [`Result<T>`] which uses [`PipelineError`].
//! The HTTP layer converts these into responses in [`crate::server::ApiError`].

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure while fetching checkpoint files.
    #[error("{0}")]
    Download(String),

    /// Tokenizer failed to load or to encode the input.
    #[error("{0}")]
    Tokenization(String),

    /// The requested compute device could not be initialized.
    #[error("{0}")]
    Device(String),

    /// The caller handed the pipeline something it cannot run on.
    #[error("{0}")]
    InvalidInput(String),

    /// Anything raised by the tensor runtime or file handling.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::tokio::ApiError> for PipelineError {
    fn from(value: hf_hub::api::tokio::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {value}"))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}
