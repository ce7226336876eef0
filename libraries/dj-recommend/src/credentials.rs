//! Spotify application credentials.
//!
//! Credentials live in a JSON secret (a file on disk, referenced from
//! configuration) with the keys `spotify_client_id` and
//! `spotify_client_secret`. Other keys are ignored.

use crate::error::{RecommendError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Client ID and secret for the client-credentials flow
#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct SecretDocument {
    #[serde(default)]
    spotify_client_id: String,
    #[serde(default)]
    spotify_client_secret: String,
}

impl SpotifyCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Parse a JSON secret string
    pub fn from_secret_json(secret: &str) -> Result<Self> {
        let doc: SecretDocument = serde_json::from_str(secret)
            .map_err(|e| RecommendError::Credentials(format!("secret is not valid JSON: {}", e)))?;

        if doc.spotify_client_id.is_empty() || doc.spotify_client_secret.is_empty() {
            return Err(RecommendError::Credentials(
                "spotify_client_id and spotify_client_secret are required".to_string(),
            ));
        }

        Ok(Self::new(doc.spotify_client_id, doc.spotify_client_secret))
    }

    /// Read a JSON secret file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let secret = tokio::fs::read_to_string(path).await.map_err(|e| {
            RecommendError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_secret_json(&secret)
    }
}
