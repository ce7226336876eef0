//! AI DJ Storage
//!
//! `SQLite` database layer for the playlist pipeline.
//!
//! This crate provides the playlist table (keyed by playlist ID with a
//! per-user creation-order index) and a local job queue with visibility
//! timeouts and dead-lettering.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries (`playlists`, `job_queue`)
//! - **Trait Adapters**: `LocalPlaylistStore` and `LocalJobQueue` expose the slices
//!   through the `dj_core` traits
//!
//! # Example
//!
//! ```rust,no_run
//! use dj_storage::{create_pool, run_migrations, LocalPlaylistStore};
//! use dj_core::{PlaylistId, PlaylistStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://dj.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = LocalPlaylistStore::new(pool);
//! let record = store.get(&PlaylistId::new("abc")).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod job_queue;
pub mod playlists;

pub use context::{LocalJobQueue, LocalPlaylistStore};
pub use error::StorageError;
pub use job_queue::{DeadLetter, QueueStats};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://dj.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Connect and migrate in one step
///
/// # Errors
///
/// Returns an error if the connection or a migration fails
pub async fn open(database_url: &str) -> Result<SqlitePool, StorageError> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(pool)
}
