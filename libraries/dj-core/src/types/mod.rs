mod ids;
mod job;
mod playlist;
mod recommendation;
mod track;

pub use ids::{PlaylistId, RequestId, UserId};
pub use job::{
    JobMessage, PlaylistRequest, ReceivedMessage, DEFAULT_TRACK_COUNT, PLAYLIST_REQUEST_TYPE,
};
pub use playlist::{PlaylistRecord, PlaylistStatus};
pub use recommendation::{Recommendations, UnavailableReason};
pub use track::{Track, TrackSource};
