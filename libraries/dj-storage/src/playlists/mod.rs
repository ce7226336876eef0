//! Playlist table
//!
//! Records are written once by the job processor and read by the API.
//! Writes are conditional on the playlist ID so redelivered jobs cannot
//! create duplicates.

use crate::error::{Result, StorageError};
use dj_core::{InsertOutcome, PlaylistId, PlaylistRecord, PlaylistStatus, Track, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn from_row(row: &SqliteRow) -> Result<PlaylistRecord> {
    let songs: String = row.get("songs");
    let songs: Vec<Track> = serde_json::from_str(&songs)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    let status: String = row.get("status");
    let status = PlaylistStatus::parse(&status)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown playlist status '{}'", status)))?;

    Ok(PlaylistRecord {
        playlist_id: row.get("playlist_id"),
        user_id: row.get("user_id"),
        prompt: row.get("prompt"),
        songs,
        created_at: row.get("created_at"),
        status,
    })
}

/// Insert a record unless its playlist ID is already taken
pub async fn insert_if_absent(pool: &SqlitePool, record: &PlaylistRecord) -> Result<InsertOutcome> {
    let songs = serde_json::to_string(&record.songs)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO playlists (playlist_id, user_id, prompt, songs, created_at, status)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(playlist_id) DO NOTHING
        "#,
    )
    .bind(&record.playlist_id)
    .bind(&record.user_id)
    .bind(&record.prompt)
    .bind(songs)
    .bind(&record.created_at)
    .bind(record.status.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        Ok(InsertOutcome::AlreadyExists)
    } else {
        Ok(InsertOutcome::Inserted)
    }
}

/// Get playlist by ID
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
    let row = sqlx::query(
        r#"
        SELECT playlist_id, user_id, prompt, songs, created_at, status
        FROM playlists
        WHERE playlist_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get a user's playlists, oldest first
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: &UserId,
    limit: u32,
) -> Result<Vec<PlaylistRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT playlist_id, user_id, prompt, songs, created_at, status
        FROM playlists
        WHERE user_id = ?
        ORDER BY created_at ASC, rowid ASC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Count stored playlists
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
