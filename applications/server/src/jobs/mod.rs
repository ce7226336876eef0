/// Background jobs
pub mod playlist_worker;

pub use playlist_worker::{BatchReport, PlaylistWorker, WorkerOptions};
