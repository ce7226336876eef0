//! Job processing
//!
//! Turns one queue message into one stored playlist record:
//!
//! 1. Decode the body; non-`playlist_request` messages are skipped
//! 2. Parse the prompt into a seed and derived count, capped at `max_count`
//! 3. Resolve the playlist ID (from the message, or derived from its content)
//! 4. Return early if that record already exists
//! 5. Look up recommendations unless offline or unconfigured
//! 6. Pad with filler tracks up to the effective count
//! 7. Insert the record if absent, then archive it
//!
//! Decode and store failures are returned to the caller so the message is
//! redelivered. Recommendation failures never abort a message.

use crate::{filler, idempotency::derive_playlist_id, prompt};
use dj_core::{
    DjError, InsertOutcome, JobMessage, PlaylistArchive, PlaylistId, PlaylistRecord,
    PlaylistRequest, PlaylistStore, RecommendationSource, Recommendations, Result,
    UnavailableReason, DEFAULT_TRACK_COUNT,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest playlist a processor builds unless configured otherwise
pub const DEFAULT_MAX_COUNT: u32 = 100;

/// Result of processing one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Message type is not handled here; nothing was written
    Skipped { kind: Option<String> },
    Created(PlaylistId),
    /// A previous delivery already wrote this playlist
    AlreadyExists(PlaylistId),
}

pub struct JobProcessor {
    store: Arc<dyn PlaylistStore>,
    recommendations: Option<Arc<dyn RecommendationSource>>,
    offline: bool,
    max_count: u32,
    archive: Option<Arc<dyn PlaylistArchive>>,
}

impl JobProcessor {
    /// A processor with no recommendation source; every playlist is filler.
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self {
            store,
            recommendations: None,
            offline: false,
            max_count: DEFAULT_MAX_COUNT,
            archive: None,
        }
    }

    pub fn with_recommendations(mut self, source: Arc<dyn RecommendationSource>) -> Self {
        self.recommendations = Some(source);
        self
    }

    /// Skip recommendation lookups entirely
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Upper bound on songs per playlist, whatever the message or prompt asks for
    pub fn max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count.max(1);
        self
    }

    pub fn with_archive(mut self, archive: Arc<dyn PlaylistArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Process one raw message body
    pub async fn process(&self, body: &str) -> Result<ProcessOutcome> {
        let message = JobMessage::decode(body)
            .map_err(|e| DjError::processing(format!("undecodable message: {}", e)))?;

        match message {
            JobMessage::PlaylistRequest(request) => self.process_request(request).await,
            JobMessage::Other { kind } => {
                debug!(kind = ?kind, "Skipping message of unhandled type");
                Ok(ProcessOutcome::Skipped { kind })
            }
        }
    }

    async fn process_request(&self, request: PlaylistRequest) -> Result<ProcessOutcome> {
        let parsed = prompt::parse(&request.prompt);
        let requested = effective_count(request.count, parsed.count);
        let count = requested.min(self.max_count);
        if count < requested {
            warn!(
                user_id = %request.user_id,
                requested,
                max_count = self.max_count,
                "Requested count exceeds limit, capping"
            );
        }

        let playlist_id = request.playlist_id.clone().unwrap_or_else(|| {
            let nonce = request.request_id.as_ref().map_or("", |r| r.as_str());
            derive_playlist_id(&request.user_id, &request.prompt, count, nonce)
        });

        if self.store.get(&playlist_id).await?.is_some() {
            info!(playlist_id = %playlist_id, "Playlist already exists, skipping redelivery");
            return Ok(ProcessOutcome::AlreadyExists(playlist_id));
        }

        let mut songs = self.lookup(&parsed.seed, count).await.into_tracks();
        songs.truncate(count as usize);

        let missing = count - songs.len() as u32;
        if missing > 0 {
            let filler_seed = if parsed.seed.is_empty() {
                request.prompt.as_str()
            } else {
                parsed.seed.as_str()
            };
            songs.extend(filler::generate(filler_seed, missing));
        }

        let record = PlaylistRecord::ready(
            playlist_id.clone(),
            request.user_id.clone(),
            request.prompt.clone(),
            songs,
        );

        match self.store.insert_if_absent(&record).await? {
            InsertOutcome::Inserted => {
                info!(
                    playlist_id = %playlist_id,
                    user_id = %record.user_id,
                    songs = record.songs.len(),
                    "Playlist created"
                );
                self.archive_record(&record).await;
                Ok(ProcessOutcome::Created(playlist_id))
            }
            InsertOutcome::AlreadyExists => {
                info!(playlist_id = %playlist_id, "Concurrent delivery wrote playlist first");
                Ok(ProcessOutcome::AlreadyExists(playlist_id))
            }
        }
    }

    async fn lookup(&self, seed: &str, count: u32) -> Recommendations {
        let result = if self.offline {
            Recommendations::Unavailable(UnavailableReason::Offline)
        } else if let Some(source) = &self.recommendations {
            source.recommend(seed, count).await
        } else {
            Recommendations::Unavailable(UnavailableReason::Unconfigured)
        };

        match &result {
            Recommendations::Found(tracks) => {
                debug!(seed = %seed, found = tracks.len(), "Recommendations found");
            }
            Recommendations::Unavailable(reason @ UnavailableReason::Failed(_)) => {
                warn!(seed = %seed, reason = %reason, "Recommendations unavailable, using filler");
            }
            Recommendations::Unavailable(reason) => {
                info!(seed = %seed, reason = %reason, "Recommendations skipped, using filler");
            }
        }

        result
    }

    async fn archive_record(&self, record: &PlaylistRecord) {
        if let Some(archive) = &self.archive {
            if let Err(e) = archive.archive(record).await {
                warn!(playlist_id = %record.playlist_id, error = %e, "Failed to archive playlist");
            }
        }
    }
}

/// Requested count if positive, else the count parsed from the prompt, else the default
pub fn effective_count(requested: Option<u32>, derived: u32) -> u32 {
    match requested {
        Some(n) if n > 0 => n,
        _ if derived > 0 => derived,
        _ => DEFAULT_TRACK_COUNT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_count_precedence() {
        assert_eq!(effective_count(Some(5), 20), 5);
        assert_eq!(effective_count(Some(0), 7), 7);
        assert_eq!(effective_count(None, 7), 7);
        assert_eq!(effective_count(None, 0), 20);
    }
}
