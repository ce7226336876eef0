use crate::client::SpotifyClient;
use async_trait::async_trait;
use dj_core::{RecommendationSource, Recommendations, UnavailableReason};
use tracing::warn;

/// `RecommendationSource` backed by Spotify track search
#[derive(Clone)]
pub struct SpotifySource {
    client: SpotifyClient,
}

impl SpotifySource {
    pub fn new(client: SpotifyClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }
}

#[async_trait]
impl RecommendationSource for SpotifySource {
    async fn recommend(&self, seed: &str, limit: u32) -> Recommendations {
        if limit == 0 {
            return Recommendations::Found(Vec::new());
        }

        match self.client.search_tracks(seed, limit).await {
            Ok(mut tracks) => {
                tracks.truncate(limit as usize);
                Recommendations::Found(tracks)
            }
            Err(e) => {
                warn!(seed = %seed, error = %e, "Track search failed");
                Recommendations::Unavailable(UnavailableReason::Failed(e.to_string()))
            }
        }
    }
}
