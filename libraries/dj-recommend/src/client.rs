//! Spotify Web API client.

use crate::error::{RecommendError, Result};
use crate::types::{SearchResponse, SpotifyConfig, TokenResponse, MAX_SEARCH_LIMIT};
use dj_core::Track;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Refresh tokens this long before they actually expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Cache tokens no longer than this, whatever `expires_in` claims
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, expires_in: u64) -> Self {
        let now = Instant::now();
        let lifetime = Duration::from_secs(expires_in).min(MAX_TOKEN_LIFETIME);
        Self {
            access_token,
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Client for the Spotify Web API using the client-credentials flow.
///
/// Access tokens are cached and shared across clones; a 401 from the API
/// drops the cached token so the next call fetches a new one.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    token: Arc<RwLock<Option<CachedToken>>>,
}

fn normalize_base_url(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(RecommendError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = raw.trim_end_matches('/').to_string();
    let parsed = Url::parse(&url).map_err(|e| RecommendError::InvalidUrl(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(RecommendError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(url)
}

fn map_send_error(e: reqwest::Error) -> RecommendError {
    if e.is_connect() || e.is_timeout() {
        RecommendError::ServiceUnreachable(e.to_string())
    } else {
        RecommendError::Request(e)
    }
}

async fn error_from_response(response: Response) -> RecommendError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        return RecommendError::RateLimited { retry_after_secs };
    }

    let message = response.text().await.unwrap_or_default();
    let rejected_client = status == StatusCode::BAD_REQUEST && message.contains("invalid_client");
    if status == StatusCode::UNAUTHORIZED || rejected_client {
        return RecommendError::AuthFailed(message);
    }

    RecommendError::ApiError {
        status: status.as_u16(),
        message,
    }
}

impl SpotifyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let api_base_url = normalize_base_url(&config.api_base_url)?;
        let accounts_base_url = normalize_base_url(&config.accounts_base_url)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("ai-dj/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RecommendError::Request)?;

        Ok(Self {
            http,
            config: SpotifyConfig {
                api_base_url,
                accounts_base_url,
                ..config
            },
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    /// Get a valid access token, requesting a new one if the cache is stale.
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self.request_token().await?;
        *guard = Some(CachedToken::new(
            response.access_token.clone(),
            response.expires_in,
        ));

        Ok(response.access_token)
    }

    /// Drop the cached token.
    pub async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.config.accounts_base_url);
        debug!(url = %url, "Requesting client credentials token");

        let response = self
            .http
            .post(&url)
            .basic_auth(
                &self.config.credentials.client_id,
                Some(&self.config.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            warn!(error = %err, "Token request failed");
            return Err(err);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            RecommendError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        info!(expires_in = token.expires_in, "Obtained access token");
        Ok(token)
    }

    /// Search tracks matching `query`, returning at most `limit` results.
    ///
    /// `limit` is clamped to `1..=50`.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>> {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        let token = self.access_token().await?;
        let url = format!("{}/v1/search", self.config.api_base_url);

        debug!(url = %url, query = %query, limit, "Searching tracks");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let search: SearchResponse = response.json().await.map_err(|e| {
            RecommendError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        let tracks: Vec<Track> = search
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.into_track())
            .take(limit as usize)
            .collect();

        debug!(found = tracks.len(), "Search complete");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_expiry_is_capped() {
        let token = CachedToken::new("t".to_string(), u64::MAX);
        assert!(token.is_fresh());
        assert!(token.expires_at <= Instant::now() + MAX_TOKEN_LIFETIME);
    }

    #[test]
    fn short_lived_token_is_stale() {
        let token = CachedToken::new("t".to_string(), 30);
        assert!(!token.is_fresh());
    }
}
