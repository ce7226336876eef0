//! AI DJ Recommendation Source
//!
//! HTTP client for the Spotify Web API, used by the job processor to look up
//! candidate tracks for a prompt seed.
//!
//! # Features
//!
//! - **Client credentials**: Server-to-server token flow with token caching
//! - **Track search**: Seed string search mapped to playlist tracks
//! - **Typed fallback**: `SpotifySource` reports failures as
//!   `Recommendations::Unavailable` instead of erroring
//!
//! # Example
//!
//! ```ignore
//! use dj_recommend::{SpotifyClient, SpotifyConfig, SpotifyCredentials, SpotifySource};
//! use dj_core::RecommendationSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = SpotifyCredentials::load("secrets/spotify.json").await?;
//!     let client = SpotifyClient::new(SpotifyConfig::new(credentials))?;
//!
//!     let source = SpotifySource::new(client);
//!     let recommendations = source.recommend("Blinding Lights", 10).await;
//!     println!("{:?}", recommendations);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod credentials;
mod error;
mod source;
mod types;

// Re-export main types
pub use client::SpotifyClient;
pub use credentials::SpotifyCredentials;
pub use error::{RecommendError, Result};
pub use source::SpotifySource;
pub use types::{SpotifyConfig, TokenResponse, MAX_SEARCH_LIMIT};
