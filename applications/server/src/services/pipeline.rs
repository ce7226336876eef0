/// Pipeline wiring - opens storage backends and assembles intake and processor
use crate::{
    config::{RecommendSettings, ServiceConfig},
    error::{Result, ServerError},
    services::BucketArchive,
    state::AppState,
};
use dj_core::{JobQueue, PlaylistStore, RecommendationSource};
use dj_pipeline::{JobProcessor, RequestIntake};
use dj_recommend::{SpotifyClient, SpotifyConfig, SpotifyCredentials, SpotifySource};
use dj_storage::{LocalJobQueue, LocalPlaylistStore};
use std::{sync::Arc, time::Duration};

/// The job queue and playlist table named in configuration.
///
/// Either may be absent; operations that need a missing backend fail with
/// `ServerError::Misconfigured`.
#[derive(Clone)]
pub struct Backends {
    pub queue: Option<Arc<LocalJobQueue>>,
    pub store: Option<Arc<LocalPlaylistStore>>,
}

impl Backends {
    /// Connect and migrate. A queue and table with the same URL share one pool.
    pub async fn open(config: &ServiceConfig) -> Result<Self> {
        let queue_pool = match &config.queue.url {
            Some(url) => Some(dj_storage::open(url).await?),
            None => None,
        };

        let store_pool = match (&config.storage.table_url, &queue_pool) {
            (Some(table_url), Some(pool)) if Some(table_url) == config.queue.url.as_ref() => {
                Some(pool.clone())
            }
            (Some(table_url), _) => Some(dj_storage::open(table_url).await?),
            (None, _) => None,
        };

        if queue_pool.is_none() {
            tracing::warn!("queue.url not set; playlist requests will be rejected");
        }
        if store_pool.is_none() {
            tracing::warn!("storage.table_url not set; playlist reads and the worker are disabled");
        }

        Ok(Self {
            queue: queue_pool
                .map(|pool| Arc::new(LocalJobQueue::new(pool, config.queue.max_receive_count))),
            store: store_pool.map(|pool| Arc::new(LocalPlaylistStore::new(pool))),
        })
    }

    pub fn job_queue(&self) -> Option<Arc<dyn JobQueue>> {
        self.queue.clone().map(|q| q as Arc<dyn JobQueue>)
    }

    pub fn playlist_store(&self) -> Option<Arc<dyn PlaylistStore>> {
        self.store.clone().map(|s| s as Arc<dyn PlaylistStore>)
    }

    /// The queue, or a misconfiguration error
    pub fn require_queue(&self) -> Result<&Arc<LocalJobQueue>> {
        self.queue
            .as_ref()
            .ok_or_else(|| ServerError::Misconfigured("job queue URL not configured".to_string()))
    }

    pub fn intake(&self, config: &ServiceConfig) -> RequestIntake {
        RequestIntake::new(self.job_queue(), config.intake.max_count)
    }

    /// State for the HTTP router
    pub fn app_state(&self, config: &ServiceConfig) -> AppState {
        AppState::new(
            Arc::new(self.intake(config)),
            self.playlist_store(),
            config.recommend.credentials_file.is_some(),
        )
    }

    /// Build the job processor; requires the playlist table
    pub async fn processor(&self, config: &ServiceConfig) -> Result<JobProcessor> {
        let store = self.playlist_store().ok_or_else(|| {
            ServerError::Misconfigured("playlist table not configured".to_string())
        })?;

        let mut processor = JobProcessor::new(store)
            .offline(config.recommend.offline)
            .max_count(config.intake.max_count);

        if config.recommend.offline {
            tracing::info!("Offline mode: recommendation lookups disabled");
        } else if let Some(source) = recommendation_source(&config.recommend).await {
            processor = processor.with_recommendations(source);
        }

        if let Some(bucket) = &config.storage.bucket_path {
            tracing::info!(path = ?bucket, "Archiving playlists to bucket");
            processor = processor.with_archive(Arc::new(BucketArchive::new(bucket.clone())));
        }

        Ok(processor)
    }
}

/// Spotify source from configured credentials.
///
/// Missing or unusable credentials leave the processor without a source,
/// so every playlist falls back to filler tracks.
pub async fn recommendation_source(
    settings: &RecommendSettings,
) -> Option<Arc<dyn RecommendationSource>> {
    let Some(path) = &settings.credentials_file else {
        tracing::info!("No Spotify credentials configured; using filler tracks");
        return None;
    };

    let credentials = match SpotifyCredentials::load(path).await {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to load Spotify credentials");
            return None;
        }
    };

    let config = SpotifyConfig {
        api_base_url: settings.api_base_url.clone(),
        accounts_base_url: settings.accounts_base_url.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
        credentials,
    };

    match SpotifyClient::new(config) {
        Ok(client) => {
            tracing::info!(api = %client.api_base_url(), "Spotify recommendations enabled");
            Some(Arc::new(SpotifySource::new(client)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Invalid Spotify client configuration");
            None
        }
    }
}
