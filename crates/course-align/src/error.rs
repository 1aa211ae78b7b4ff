//! Error types for the course alignment service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingestion::multipart::MalformedBodyError;

/// Result type alias for course alignment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Course alignment errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request was understood but rejected
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Multipart body could not be parsed at all
    #[error("Malformed multipart body: {0}")]
    MalformedBody(#[from] MalformedBodyError),

    /// Upload did not carry a multipart content type
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Embedding service error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Document storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Submission not found
    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Error::MalformedBody(err) => {
                (StatusCode::BAD_REQUEST, "malformed_body", err.to_string())
            }
            Error::UnsupportedMediaType(ct) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                format!("Expected multipart/form-data, got '{}'", ct),
            ),
            Error::Embedding(msg) => (StatusCode::BAD_GATEWAY, "embedding_error", msg.clone()),
            Error::Storage(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg.clone())
            }
            Error::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
            Error::SubmissionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Submission not found: {}", id),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
