use crate::{job_queue, playlists};
use async_trait::async_trait;
use dj_core::{
    error::Result, InsertOutcome, JobQueue, PlaylistId, PlaylistRecord, PlaylistStore,
    ReceivedMessage, UserId,
};
use sqlx::SqlitePool;
use std::time::Duration;

/// Playlist table backed by `SQLite`
#[derive(Clone)]
pub struct LocalPlaylistStore {
    pool: SqlitePool,
}

impl LocalPlaylistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PlaylistStore for LocalPlaylistStore {
    async fn insert_if_absent(&self, record: &PlaylistRecord) -> Result<InsertOutcome> {
        Ok(playlists::insert_if_absent(&self.pool, record).await?)
    }

    async fn get(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
        Ok(playlists::get_by_id(&self.pool, id).await?)
    }

    async fn list_by_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<PlaylistRecord>> {
        Ok(playlists::list_by_user(&self.pool, user_id, limit).await?)
    }
}

/// Job queue backed by `SQLite`
#[derive(Clone)]
pub struct LocalJobQueue {
    pool: SqlitePool,
    max_receive_count: u32,
}

impl LocalJobQueue {
    /// Messages received more than `max_receive_count` times are dead-lettered
    pub fn new(pool: SqlitePool, max_receive_count: u32) -> Self {
        Self {
            pool,
            max_receive_count,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn max_receive_count(&self) -> u32 {
        self.max_receive_count
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn send(&self, body: &str) -> Result<String> {
        let id = job_queue::send(&self.pool, body).await?;
        Ok(id.to_string())
    }

    async fn receive(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>> {
        Ok(job_queue::receive(
            &self.pool,
            max_messages,
            visibility_timeout,
            self.max_receive_count,
        )
        .await?)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<bool> {
        Ok(job_queue::delete(&self.pool, receipt_handle).await?)
    }

    async fn release(
        &self,
        receipt_handle: &str,
        error: &str,
        visible_after: Duration,
    ) -> Result<bool> {
        Ok(job_queue::release(&self.pool, receipt_handle, error, visible_after).await?)
    }

    async fn dead_letter(&self, receipt_handle: &str, error: &str) -> Result<bool> {
        Ok(job_queue::dead_letter(&self.pool, receipt_handle, error).await?)
    }
}
