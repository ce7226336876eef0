/// Playlist domain types
use super::ids::{PlaylistId, UserId};
use super::track::Track;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistStatus {
    /// Generation finished and songs are available
    Ready,
}

impl PlaylistStatus {
    /// Convert status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistStatus::Ready => "ready",
        }
    }

    /// Parse status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ready" => Some(PlaylistStatus::Ready),
            _ => None,
        }
    }
}

/// A generated playlist as persisted in the playlist table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub prompt: String,
    pub songs: Vec<Track>,

    /// Creation time as epoch seconds, string-encoded
    pub created_at: String,
    pub status: PlaylistStatus,
}

impl PlaylistRecord {
    /// Build a finished record stamped with the current time
    pub fn ready(
        playlist_id: PlaylistId,
        user_id: UserId,
        prompt: impl Into<String>,
        songs: Vec<Track>,
    ) -> Self {
        Self {
            playlist_id,
            user_id,
            prompt: prompt.into(),
            songs,
            created_at: Utc::now().timestamp().to_string(),
            status: PlaylistStatus::Ready,
        }
    }

    /// Creation time as epoch seconds, if the stored string is numeric
    pub fn created_at_epoch(&self) -> Option<i64> {
        self.created_at.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_record_has_numeric_timestamp() {
        let record = PlaylistRecord::ready(
            PlaylistId::new("p1"),
            UserId::new("u1"),
            "chill vibes",
            vec![],
        );

        assert_eq!(record.status, PlaylistStatus::Ready);
        let created = record.created_at_epoch().unwrap();
        assert!(created <= Utc::now().timestamp());
    }

    #[test]
    fn status_string_conversion() {
        assert_eq!(PlaylistStatus::Ready.as_str(), "ready");
        assert_eq!(PlaylistStatus::parse("ready"), Some(PlaylistStatus::Ready));
        assert_eq!(PlaylistStatus::parse("pending"), None);
    }

    #[test]
    fn record_serializes_with_table_field_names() {
        let record = PlaylistRecord::ready(PlaylistId::new("p1"), UserId::new("u1"), "x", vec![]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["playlist_id"], "p1");
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["status"], "ready");
        assert!(json["created_at"].is_string());
    }
}
