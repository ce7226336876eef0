/// Shared application state
use crate::error::{Result, ServerError};
use dj_core::PlaylistStore;
use dj_pipeline::RequestIntake;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<RequestIntake>,

    /// `None` when no playlist table is configured
    pub store: Option<Arc<dyn PlaylistStore>>,

    /// Whether Spotify credentials are configured
    pub recommend_configured: bool,
}

impl AppState {
    pub fn new(
        intake: Arc<RequestIntake>,
        store: Option<Arc<dyn PlaylistStore>>,
        recommend_configured: bool,
    ) -> Self {
        Self {
            intake,
            store,
            recommend_configured,
        }
    }

    /// The playlist table, or a misconfiguration error
    pub fn store(&self) -> Result<&Arc<dyn PlaylistStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| ServerError::Misconfigured("playlist table not configured".to_string()))
    }
}
