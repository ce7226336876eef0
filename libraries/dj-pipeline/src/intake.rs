//! Request intake
//!
//! Validates a playlist request, assigns its playlist ID, and publishes the
//! job message. Returns as soon as the message is queued.

use crate::idempotency::derive_playlist_id;
use dj_core::{
    DjError, JobQueue, PlaylistId, PlaylistRequest, RequestId, Result, UserId, DEFAULT_TRACK_COUNT,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// A client's playlist request, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitPlaylist {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    /// Resubmitting with the same key resolves to the same playlist
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Acknowledgment for a queued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub playlist_id: PlaylistId,
    pub request_id: RequestId,
    pub message_id: String,
}

pub struct RequestIntake {
    queue: Option<Arc<dyn JobQueue>>,
    max_count: u32,
}

impl RequestIntake {
    /// `queue` is `None` when no queue endpoint is configured; every
    /// submission then fails with `ServiceMisconfigured`.
    pub fn new(queue: Option<Arc<dyn JobQueue>>, max_count: u32) -> Self {
        Self { queue, max_count }
    }

    pub fn is_configured(&self) -> bool {
        self.queue.is_some()
    }

    /// Validate and enqueue a request
    pub async fn submit(&self, request: SubmitPlaylist) -> Result<Accepted> {
        let prompt = request.prompt.unwrap_or_default();
        let user_id = UserId::new(request.user_id.unwrap_or_default());

        if prompt.trim().is_empty() || user_id.is_blank() {
            return Err(DjError::invalid_request("prompt and user_id are required"));
        }

        let count = self.validate_count(request.count)?;

        let Some(queue) = self.queue.as_ref() else {
            return Err(DjError::misconfigured("job queue URL not configured"));
        };

        let request_id = match request.idempotency_key {
            Some(key) if !key.trim().is_empty() => RequestId::new(key),
            _ => RequestId::generate(),
        };
        let playlist_id = derive_playlist_id(&user_id, &prompt, count, request_id.as_str());

        let message = PlaylistRequest {
            request_id: Some(request_id.clone()),
            playlist_id: Some(playlist_id.clone()),
            ..PlaylistRequest::new(prompt, user_id, Some(count))
        };
        let body = message.to_message_body()?;
        let message_id = queue.send(&body).await?;

        info!(
            playlist_id = %playlist_id,
            user_id = %message.user_id,
            message_id = %message_id,
            count,
            "Playlist request queued"
        );

        Ok(Accepted {
            playlist_id,
            request_id,
            message_id,
        })
    }

    /// Missing or zero means the default count
    fn validate_count(&self, count: Option<i64>) -> Result<u32> {
        match count {
            None | Some(0) => Ok(DEFAULT_TRACK_COUNT),
            Some(n) if n < 0 => Err(DjError::invalid_request("count must not be negative")),
            Some(n) => match u32::try_from(n) {
                Ok(n) if n <= self.max_count => Ok(n),
                _ => Err(DjError::invalid_request(format!(
                    "count must be at most {}",
                    self.max_count
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> RequestIntake {
        RequestIntake::new(None, 100)
    }

    #[test]
    fn count_defaults() {
        let intake = unconfigured();
        assert_eq!(intake.validate_count(None).unwrap(), 20);
        assert_eq!(intake.validate_count(Some(0)).unwrap(), 20);
        assert_eq!(intake.validate_count(Some(7)).unwrap(), 7);
        assert_eq!(intake.validate_count(Some(100)).unwrap(), 100);
    }

    #[test]
    fn count_out_of_range() {
        let intake = unconfigured();
        assert!(matches!(
            intake.validate_count(Some(-1)),
            Err(DjError::InvalidRequest(_))
        ));
        assert!(matches!(
            intake.validate_count(Some(101)),
            Err(DjError::InvalidRequest(_))
        ));
        assert!(matches!(
            intake.validate_count(Some(i64::MAX)),
            Err(DjError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn validation_precedes_configuration_check() {
        let result = unconfigured()
            .submit(SubmitPlaylist {
                prompt: Some("a".into()),
                user_id: Some(String::new()),
                count: Some(5),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(DjError::InvalidRequest(_))));
    }
}
