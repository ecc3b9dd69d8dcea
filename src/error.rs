//! Common error types for the dispatch gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Queue for '{model}' is at capacity ({depth} jobs pending)")]
    Overloaded { model: String, depth: u64 },

    #[error("Queue broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("Generation job failed: {0}")]
    JobFailed(String),

    #[error("Timed out waiting for generation result")]
    JobTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::UnknownModel(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                Some("unknown_model"),
            ),
            AppError::Overloaded { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "capacity_error",
                Some("queue_full"),
            ),
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::BrokerUnavailable(_)
            | AppError::JobFailed(_)
            | AppError::JobTimeout
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        // Server-side failures keep their detail in the logs; the caller
        // sees a generic message only.
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message,
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
