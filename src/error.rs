/// Unified error types for the image service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Request-level validation errors (missing upload part, oversized body)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested original does not exist in storage
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored bytes are not a decodable raster image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Storage backend read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert AppError to an HTTP response with a JSON error envelope
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Decode(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;
