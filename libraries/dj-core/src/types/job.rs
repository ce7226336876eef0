//! Queue message contract between request intake and the job processor
//!
//! Wire format is a JSON object tagged by `type`:
//!
//! ```json
//! {"type": "playlist_request", "prompt": "...", "user_id": "...", "count": 20}
//! ```
//!
//! `request_id` and `playlist_id` are optional so messages written by older
//! producers still decode.

use super::ids::{PlaylistId, RequestId, UserId};
use serde::{Deserialize, Serialize};

/// Message type handled by the job processor
pub const PLAYLIST_REQUEST_TYPE: &str = "playlist_request";

/// Track count used when neither the caller nor the prompt names one
pub const DEFAULT_TRACK_COUNT: u32 = 20;

/// A playlist generation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRequest {
    pub prompt: String,
    pub user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<PlaylistId>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    request: &'a PlaylistRequest,
}

impl PlaylistRequest {
    pub fn new(prompt: impl Into<String>, user_id: UserId, count: Option<u32>) -> Self {
        Self {
            prompt: prompt.into(),
            user_id,
            count,
            request_id: None,
            playlist_id: None,
        }
    }

    /// Serialize as a tagged queue message body
    pub fn to_message_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(&Envelope {
            kind: PLAYLIST_REQUEST_TYPE,
            request: self,
        })
    }
}

/// A decoded queue message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobMessage {
    PlaylistRequest(PlaylistRequest),
    /// Any message whose `type` is missing or not recognized
    Other { kind: Option<String> },
}

impl JobMessage {
    /// Decode a raw message body.
    ///
    /// Fails only when the body is not JSON or a `playlist_request` is missing
    /// required fields; unknown types decode to `Other`.
    pub fn decode(body: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)?;

        match value.get("type").and_then(serde_json::Value::as_str) {
            Some(PLAYLIST_REQUEST_TYPE) => {
                Ok(JobMessage::PlaylistRequest(serde_json::from_value(value)?))
            }
            other => Ok(JobMessage::Other {
                kind: other.map(str::to_string),
            }),
        }
    }
}

/// A message leased from the job queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: String,

    /// Handle used to acknowledge or release this delivery
    pub receipt_handle: String,
    pub body: String,

    /// Number of times this message has been delivered, this delivery included
    pub receive_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_carries_type_tag() {
        let request = PlaylistRequest::new("songs like 'Blinding Lights'", UserId::new("u1"), Some(5));
        let body = request.to_message_body().unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["type"], "playlist_request");
        assert_eq!(value["prompt"], "songs like 'Blinding Lights'");
        assert_eq!(value["user_id"], "u1");
        assert_eq!(value["count"], 5);
        assert!(value.get("playlist_id").is_none());
    }

    #[test]
    fn decodes_legacy_message_without_ids() {
        let body = r#"{"type":"playlist_request","prompt":"20 songs","user_id":"u1","count":5}"#;

        let JobMessage::PlaylistRequest(request) = JobMessage::decode(body).unwrap() else {
            panic!("expected playlist request");
        };
        assert_eq!(request.count, Some(5));
        assert!(request.request_id.is_none());
        assert!(request.playlist_id.is_none());
    }

    #[test]
    fn unknown_type_is_other() {
        let decoded = JobMessage::decode(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(
            decoded,
            JobMessage::Other {
                kind: Some("ping".to_string())
            }
        );

        let untyped = JobMessage::decode(r#"{"prompt":"x"}"#).unwrap();
        assert_eq!(untyped, JobMessage::Other { kind: None });
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(JobMessage::decode("not json").is_err());
        assert!(JobMessage::decode(r#"{"type":"playlist_request","prompt":"x"}"#).is_err());
    }
}
