//! Typed outcome of a recommendation lookup

use super::track::Track;
use std::fmt;

/// Why no recommendations were obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Lookups are disabled by the offline flag
    Offline,
    /// No recommendation source is configured
    Unconfigured,
    /// The lookup was attempted and failed
    Failed(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Offline => write!(f, "offline mode"),
            UnavailableReason::Unconfigured => write!(f, "no recommendation source configured"),
            UnavailableReason::Failed(msg) => write!(f, "lookup failed: {}", msg),
        }
    }
}

/// Result of asking the recommendation source for candidates
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendations {
    Found(Vec<Track>),
    Unavailable(UnavailableReason),
}

impl Recommendations {
    /// Tracks obtained, empty when unavailable
    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            Recommendations::Found(tracks) => tracks,
            Recommendations::Unavailable(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_yields_no_tracks() {
        let recs = Recommendations::Unavailable(UnavailableReason::Offline);
        assert!(recs.into_tracks().is_empty());
    }

    #[test]
    fn reason_display() {
        let reason = UnavailableReason::Failed("timeout".into());
        assert_eq!(reason.to_string(), "lookup failed: timeout");
    }
}
