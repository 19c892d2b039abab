//! Error types for the metatutor service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for metatutor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed client query (empty or over-length)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Model artifact missing or corrupt at load time
    #[error("Model load error for '{name}': {message}")]
    Model { name: String, message: String },

    /// Feedback persistence error
    #[error("Feedback store error: {0}")]
    Store(String),

    /// Retraining cycle error (export, trainer subprocess, reload)
    #[error("Retraining error: {0}")]
    Retrain(String),

    /// Embedding generation error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generative model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a model load error
    pub fn model(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Model {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a feedback store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a retraining error
    pub fn retrain(message: impl Into<String>) -> Self {
        Self::Retrain(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, "invalid_query", msg.clone()),
            Error::Model { name, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "model_error",
                format!("'{}': {}", name, message),
            ),
            Error::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg.clone()),
            Error::Retrain(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "retrain_error", msg.clone())
            }
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
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
