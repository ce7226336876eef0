//! AI DJ Server Library
//!
//! HTTP intake, queue worker runtime, and wiring for the playlist pipeline.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServiceConfig;
pub use error::{Result, ServerError};
pub use jobs::{BatchReport, PlaylistWorker, WorkerOptions};
pub use services::{bucket_archive::BucketArchive, pipeline::Backends};
pub use state::AppState;
