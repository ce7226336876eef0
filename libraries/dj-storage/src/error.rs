/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Stored data does not match the expected shape
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for dj_core::DjError {
    fn from(err: StorageError) -> Self {
        dj_core::DjError::storage(err.to_string())
    }
}
