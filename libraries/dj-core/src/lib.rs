//! AI DJ Core
//!
//! Domain types, traits, and error handling shared by the playlist request
//! pipeline: the HTTP intake, the queue worker, and the storage backends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlaylistRecord`, `Track`, `PlaylistRequest`, etc.
//! - **Core Traits**: `PlaylistStore`, `JobQueue`, `RecommendationSource`, `PlaylistArchive`
//! - **Error Handling**: Unified `DjError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use dj_core::types::{JobMessage, PlaylistRequest, UserId};
//!
//! let request = PlaylistRequest::new("songs like 'Blinding Lights'", UserId::new("u1"), Some(5));
//! let body = request.to_message_body().unwrap();
//!
//! match JobMessage::decode(&body).unwrap() {
//!     JobMessage::PlaylistRequest(decoded) => assert_eq!(decoded.count, Some(5)),
//!     JobMessage::Other { .. } => unreachable!(),
//! }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{DjError, Result};
pub use traits::{InsertOutcome, JobQueue, PlaylistArchive, PlaylistStore, RecommendationSource};

pub use types::{
    JobMessage, PlaylistId, PlaylistRecord, PlaylistRequest, PlaylistStatus, ReceivedMessage,
    Recommendations, RequestId, Track, TrackSource, UnavailableReason, UserId,
    DEFAULT_TRACK_COUNT, PLAYLIST_REQUEST_TYPE,
};
