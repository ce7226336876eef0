/// Core error types for the playlist pipeline
use thiserror::Error;

/// Result type alias using `DjError`
pub type Result<T> = std::result::Result<T, DjError>;

/// Core error type for the playlist pipeline
#[derive(Error, Debug)]
pub enum DjError {
    /// Caller input is missing required fields or out of range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A required setting (queue, table) is not configured
    #[error("Service misconfigured: {0}")]
    ServiceMisconfigured(String),

    /// Recommendation lookup failed
    #[error("External source unavailable: {0}")]
    ExternalSourceUnavailable(String),

    /// A queue message could not be processed
    #[error("Processing failure: {0}")]
    ProcessingFailure(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Job queue errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl DjError {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a misconfiguration error
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::ServiceMisconfigured(msg.into())
    }

    /// Create a processing failure
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::ProcessingFailure(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a queue error
    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether redelivering the message that produced this error can succeed.
    ///
    /// Caller mistakes and missing configuration are not retryable; decode,
    /// storage, and queue failures are.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidRequest(_) | Self::ServiceMisconfigured(_) | Self::NotFound { .. } => {
                false
            }
            Self::ExternalSourceUnavailable(_)
            | Self::ProcessingFailure(_)
            | Self::Storage(_)
            | Self::Queue(_)
            | Self::Serialization(_)
            | Self::Database(_) => true,
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for DjError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_not_retryable() {
        assert!(!DjError::invalid_request("prompt missing").is_retryable());
        assert!(!DjError::misconfigured("queue").is_retryable());
        assert!(!DjError::not_found("Playlist", "p1").is_retryable());
    }

    #[test]
    fn processing_errors_are_retryable() {
        assert!(DjError::processing("bad body").is_retryable());
        assert!(DjError::storage("disk full").is_retryable());
        assert!(DjError::queue("locked").is_retryable());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = DjError::not_found("Playlist", "abc");
        assert_eq!(err.to_string(), "Playlist not found: abc");
    }
}
