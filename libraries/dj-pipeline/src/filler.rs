//! Placeholder tracks
//!
//! Used to pad a playlist when the recommendation source returned fewer
//! tracks than requested (or nothing at all).

use dj_core::Track;

pub const FILLER_ARTIST: &str = "Mock Artist";

/// Neutral relevance score assigned to every filler track
pub const FILLER_SCORE: f64 = 0.5;

/// Generate `count` filler tracks titled "Mock Song 1".."Mock Song {count}".
///
/// The seed does not influence the output; it is accepted so callers can
/// switch to seeded generation without changing call sites.
pub fn generate(_seed: &str, count: u32) -> Vec<Track> {
    (1..=count)
        .map(|i| Track::filler(format!("Mock Song {}", i), FILLER_ARTIST, FILLER_SCORE))
        .collect()
}
