//! Seams between the pipeline and its external collaborators
//!
//! Storage, queueing, and recommendation backends are all async and shared
//! across tasks behind `Arc<dyn Trait>`.

use crate::error::Result;
use crate::types::{PlaylistId, PlaylistRecord, ReceivedMessage, Recommendations, UserId};
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a conditional insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same playlist ID was already stored; nothing was written
    AlreadyExists,
}

/// Playlist table keyed by playlist ID, with a secondary index on
/// `(user_id, created_at)`
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Insert the record unless one with the same ID exists
    async fn insert_if_absent(&self, record: &PlaylistRecord) -> Result<InsertOutcome>;

    /// Get a record by ID
    async fn get(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>>;

    /// A user's records in creation order
    async fn list_by_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<PlaylistRecord>>;
}

/// At-least-once message queue with visibility timeouts
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Publish a message body, returning its message ID
    async fn send(&self, body: &str) -> Result<String>;

    /// Lease up to `max_messages` visible messages.
    ///
    /// Leased messages stay invisible to other consumers until
    /// `visibility_timeout` elapses or they are released.
    async fn receive(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>>;

    /// Acknowledge a delivery. Returns false if the receipt is stale.
    async fn delete(&self, receipt_handle: &str) -> Result<bool>;

    /// Record a failed delivery; the message becomes visible after `visible_after`.
    /// Returns false if the receipt is stale.
    async fn release(
        &self,
        receipt_handle: &str,
        error: &str,
        visible_after: Duration,
    ) -> Result<bool>;

    /// Move a leased message straight to the dead-letter set.
    /// Returns false if the receipt is stale.
    async fn dead_letter(&self, receipt_handle: &str, error: &str) -> Result<bool>;
}

/// Source of candidate tracks for a seed string
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fetch up to `limit` tracks. Never fails; failures are reported as
    /// `Recommendations::Unavailable`.
    async fn recommend(&self, seed: &str, limit: u32) -> Recommendations;
}

/// Durable copy of finished playlists outside the table
#[async_trait]
pub trait PlaylistArchive: Send + Sync {
    async fn archive(&self, record: &PlaylistRecord) -> Result<()>;
}
