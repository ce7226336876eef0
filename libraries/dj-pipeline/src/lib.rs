//! AI DJ Playlist Pipeline
//!
//! The request → queue → process → store flow for playlist generation.
//!
//! # Architecture
//!
//! - `prompt`: Derives a search seed and track count from a free-text prompt
//! - `filler`: Deterministic placeholder tracks used to pad results
//! - `idempotency`: Content-derived playlist IDs
//! - `intake`: Validates requests and publishes job messages
//! - `processor`: Consumes job messages and writes playlist records
//!
//! Intake assigns the playlist ID up front and carries it in the message,
//! so a redelivered message resolves to the record already written.

pub mod filler;
pub mod idempotency;
pub mod intake;
pub mod processor;
pub mod prompt;

pub use idempotency::derive_playlist_id;
pub use intake::{Accepted, RequestIntake, SubmitPlaylist};
pub use processor::{JobProcessor, ProcessOutcome};
pub use prompt::ParsedPrompt;
