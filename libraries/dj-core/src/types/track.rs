//! Track entries stored inside a playlist record

use serde::{Deserialize, Serialize};

/// Where a track came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// Returned by the recommendation source
    External,
    /// Placeholder produced to pad a short result
    Filler,
}

impl TrackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackSource::External => "external",
            TrackSource::Filler => "filler",
        }
    }
}

/// A single playlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub source: TrackSource,

    /// Identifier in the recommendation source's catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Relevance score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Track {
    /// A track returned by the recommendation source
    pub fn external(
        title: impl Into<String>,
        artist: impl Into<String>,
        external_id: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            source: TrackSource::External,
            external_id,
            score: None,
        }
    }

    /// A placeholder track
    pub fn filler(title: impl Into<String>, artist: impl Into<String>, score: f64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            source: TrackSource::Filler,
            external_id: None,
            score: Some(score),
        }
    }
}
