use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::PipelineError;

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug)]
pub enum ApiError {
    /// The body could not be read as the expected JSON shape.
    InvalidRequest { status: StatusCode, message: String },
    /// The body parsed but a field holds a value the endpoint cannot serve.
    Validation { field: &'static str, message: String },
    /// The model failed while serving the request.
    Inference(PipelineError),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest { status, .. } => *status,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest { message, .. } => ("invalid_request", message.clone(), None),
            ApiError::Validation { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.to_string()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::Inference(err) => ("inference_error", err.to_string(), None),
            ApiError::Internal(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        if status.is_server_error() {
            tracing::error!(status = %status, error_type = %body.error_type, message = %body.message, "request failed");
        } else {
            tracing::warn!(status = %status, error_type = %body.error_type, message = %body.message, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Inference(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("inference task failed: {err}"))
    }
}
