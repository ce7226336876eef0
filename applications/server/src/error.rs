/// Server error types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dj_core::DjError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A required setting is missing; the message names it for the operator
    #[error("Service misconfigured: {0}")]
    Misconfigured(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] dj_storage::StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DjError> for ServerError {
    fn from(err: DjError) -> Self {
        match err {
            DjError::InvalidRequest(msg) => ServerError::InvalidRequest(msg),
            DjError::ServiceMisconfigured(msg) => ServerError::Misconfigured(msg),
            DjError::NotFound { entity, id } => {
                ServerError::NotFound(format!("{} not found: {}", entity, id))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

/// Malformed or mistyped request bodies are the caller's fault
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Misconfigured(msg) => {
                tracing::error!("Service misconfigured: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ServerError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
