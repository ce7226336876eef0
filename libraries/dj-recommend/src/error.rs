//! Error types for the recommendation client.

use thiserror::Error;

/// Errors that can occur when talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Credentials were rejected or the token expired
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Credential secret is missing fields or unreadable
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Invalid base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// API is offline or unreachable
    #[error("Service unreachable: {0}")]
    ServiceUnreachable(String),

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

impl From<RecommendError> for dj_core::DjError {
    fn from(err: RecommendError) -> Self {
        dj_core::DjError::ExternalSourceUnavailable(err.to_string())
    }
}

/// Result type for recommendation client operations.
pub type Result<T> = std::result::Result<T, RecommendError>;
