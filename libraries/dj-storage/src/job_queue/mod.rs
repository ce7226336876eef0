//! Job queue storage
//!
//! A local at-least-once queue for playlist requests.
//!
//! - `receive` leases messages: each lease bumps `receive_count`, issues a
//!   fresh receipt handle, and hides the message until its visibility
//!   deadline.
//! - `delete` acknowledges a lease; `release` records a failure and makes
//!   the message visible again after a delay.
//! - A message that has already been received `max_receive_count` times is
//!   moved to the dead-letter set on its next receive instead of being
//!   delivered again. `dead_letter` moves a leased message there directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use dj_storage::job_queue;
//! use std::time::Duration;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! job_queue::send(pool, r#"{"type":"playlist_request"}"#).await?;
//!
//! for message in job_queue::receive(pool, 5, Duration::from_secs(60), 3).await? {
//!     // Process message...
//!     job_queue::delete(pool, &message.receipt_handle).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use chrono::Utc;
use dj_core::ReceivedMessage;
use sqlx::{Row, SqlitePool};
use std::time::Duration;
use uuid::Uuid;

/// A message that exceeded its delivery attempts
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub id: i64,
    pub body: String,
    pub receive_count: i64,
    pub last_error: Option<String>,
    pub dead_lettered_at: i64,
    pub created_at: i64,
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub visible: i64,
    /// Leased and awaiting acknowledgment
    pub in_flight: i64,
    /// Released after a failure, waiting out the retry delay
    pub delayed: i64,
    pub dead_lettered: i64,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Publish a message
pub async fn send(pool: &SqlitePool, body: &str) -> Result<i64> {
    let now = now_millis();
    let result = sqlx::query(
        r#"
        INSERT INTO job_messages (body, visible_at, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(body)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Lease up to `max_messages` visible messages
pub async fn receive(
    pool: &SqlitePool,
    max_messages: u32,
    visibility_timeout: Duration,
    max_receive_count: u32,
) -> Result<Vec<ReceivedMessage>> {
    let now = now_millis();
    let visible_until = now.saturating_add(duration_millis(visibility_timeout));

    let candidates = sqlx::query(
        r#"
        SELECT id, receive_count
        FROM job_messages
        WHERE dead_lettered_at IS NULL AND visible_at <= ?
        ORDER BY visible_at ASC, id ASC
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(i64::from(max_messages))
    .fetch_all(pool)
    .await?;

    let mut leased = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let id: i64 = candidate.get("id");
        let receive_count: i64 = candidate.get("receive_count");

        if receive_count >= i64::from(max_receive_count) {
            let moved = sqlx::query(
                r#"
                UPDATE job_messages
                SET dead_lettered_at = ?, receipt_handle = NULL
                WHERE id = ? AND dead_lettered_at IS NULL AND receive_count = ?
                "#,
            )
            .bind(now)
            .bind(id)
            .bind(receive_count)
            .execute(pool)
            .await?;

            if moved.rows_affected() == 1 {
                tracing::warn!(
                    message_id = id,
                    receive_count,
                    "Message exceeded max receive count, moved to dead letters"
                );
            }
            continue;
        }

        // The receive_count guard makes the claim fail if another consumer won it.
        let receipt_handle = Uuid::new_v4().to_string();
        let claimed = sqlx::query(
            r#"
            UPDATE job_messages
            SET receive_count = receive_count + 1, visible_at = ?, receipt_handle = ?
            WHERE id = ? AND dead_lettered_at IS NULL AND visible_at <= ? AND receive_count = ?
            RETURNING body, receive_count
            "#,
        )
        .bind(visible_until)
        .bind(&receipt_handle)
        .bind(id)
        .bind(now)
        .bind(receive_count)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = claimed {
            leased.push(ReceivedMessage {
                message_id: id.to_string(),
                receipt_handle,
                body: row.get("body"),
                receive_count: row.get::<i64, _>("receive_count") as u32,
            });
        }
    }

    Ok(leased)
}

/// Acknowledge a delivery (remove from queue)
pub async fn delete(pool: &SqlitePool, receipt_handle: &str) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM job_messages WHERE receipt_handle = ? AND dead_lettered_at IS NULL",
    )
    .bind(receipt_handle)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Mark a delivery as failed; the message becomes visible after `visible_after`
pub async fn release(
    pool: &SqlitePool,
    receipt_handle: &str,
    error: &str,
    visible_after: Duration,
) -> Result<bool> {
    let visible_at = now_millis().saturating_add(duration_millis(visible_after));
    let result = sqlx::query(
        r#"
        UPDATE job_messages
        SET last_error = ?, visible_at = ?, receipt_handle = NULL
        WHERE receipt_handle = ? AND dead_lettered_at IS NULL
        "#,
    )
    .bind(error)
    .bind(visible_at)
    .bind(receipt_handle)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Dead-letter a leased message without waiting for its remaining deliveries
pub async fn dead_letter(pool: &SqlitePool, receipt_handle: &str, error: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE job_messages
        SET dead_lettered_at = ?, last_error = ?, receipt_handle = NULL
        WHERE receipt_handle = ? AND dead_lettered_at IS NULL
        "#,
    )
    .bind(now_millis())
    .bind(error)
    .bind(receipt_handle)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// List dead-lettered messages, oldest first
pub async fn dead_letters(pool: &SqlitePool) -> Result<Vec<DeadLetter>> {
    let rows = sqlx::query(
        r#"
        SELECT id, body, receive_count, last_error, dead_lettered_at, created_at
        FROM job_messages
        WHERE dead_lettered_at IS NOT NULL
        ORDER BY dead_lettered_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| DeadLetter {
            id: r.get("id"),
            body: r.get("body"),
            receive_count: r.get("receive_count"),
            last_error: r.get("last_error"),
            dead_lettered_at: r.get("dead_lettered_at"),
            created_at: r.get("created_at"),
        })
        .collect())
}

/// Move every dead letter back onto the live queue with a fresh attempt budget
pub async fn redrive_dead_letters(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE job_messages
        SET dead_lettered_at = NULL, receive_count = 0, visible_at = ?, receipt_handle = NULL
        WHERE dead_lettered_at IS NOT NULL
        "#,
    )
    .bind(now_millis())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Drop all dead letters
pub async fn purge_dead_letters(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM job_messages WHERE dead_lettered_at IS NOT NULL")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Get queue statistics
pub async fn stats(pool: &SqlitePool) -> Result<QueueStats> {
    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN dead_lettered_at IS NULL AND visible_at <= ?1 THEN 1 ELSE 0 END), 0) AS visible,
            COALESCE(SUM(CASE WHEN dead_lettered_at IS NULL AND visible_at > ?1 AND receipt_handle IS NOT NULL THEN 1 ELSE 0 END), 0) AS in_flight,
            COALESCE(SUM(CASE WHEN dead_lettered_at IS NULL AND visible_at > ?1 AND receipt_handle IS NULL THEN 1 ELSE 0 END), 0) AS delayed,
            COALESCE(SUM(CASE WHEN dead_lettered_at IS NOT NULL THEN 1 ELSE 0 END), 0) AS dead_lettered
        FROM job_messages
        "#,
    )
    .bind(now_millis())
    .fetch_one(pool)
    .await?;

    Ok(QueueStats {
        visible: row.get("visible"),
        in_flight: row.get("in_flight"),
        delayed: row.get("delayed"),
        dead_lettered: row.get("dead_lettered"),
    })
}
