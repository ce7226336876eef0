//! Types for Spotify Web API requests and responses.

use crate::credentials::SpotifyCredentials;
use serde::Deserialize;
use std::time::Duration;

/// Largest `limit` the search endpoint accepts
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Configuration for connecting to the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Base URL of the Web API (e.g., "https://api.spotify.com")
    pub api_base_url: String,
    /// Base URL of the accounts service that issues tokens
    pub accounts_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub credentials: SpotifyCredentials,
}

impl SpotifyConfig {
    /// Create a config pointing at the public Spotify endpoints.
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self {
            api_base_url: "https://api.spotify.com".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            timeout: Duration::from_secs(15),
            credentials,
        }
    }

    /// Point both the API and accounts service at one base URL (mock servers).
    pub fn with_base_url(credentials: SpotifyCredentials, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            api_base_url: base_url.clone(),
            accounts_base_url: base_url,
            ..Self::new(credentials)
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Response from the client-credentials token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Token validity in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

// =============================================================================
// Search Types
// =============================================================================

/// Response from `GET /v1/search?type=track`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPage {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpotifyTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpotifyArtist {
    #[serde(default)]
    pub name: Option<String>,
}

impl SpotifyTrack {
    /// Convert to a playlist track; multiple artists are joined with ", "
    pub(crate) fn into_track(self) -> dj_core::Track {
        let artist = self
            .artists
            .into_iter()
            .filter_map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", ");

        dj_core::Track::external(self.name.unwrap_or_default(), artist, self.id)
    }
}
