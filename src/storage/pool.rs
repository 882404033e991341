//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - Connection limits and timeouts
//! - Automatic database file creation

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Shared handle to the SQLite pool.
pub type DbPool = Arc<Pool<Sqlite>>;

/// Maximum pooled connections; probes write concurrently but each write is tiny
const MAX_CONNECTIONS: u32 = 10;

/// How long a writer waits for a connection before the write counts as failed.
///
/// Kept short so a saturated pool turns into failed outcomes for a pass
/// instead of stalling it.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long SQLite waits on a locked database before returning SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initializes and returns a database connection pool for the file at `db_path`.
///
/// Creates the database file if it doesn't exist and enables WAL mode
/// for better concurrent access.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<DbPool, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    if !db_path.exists() {
        info!("Creating database file at {}", db_path_str);
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path_str))
        .map_err(|e| {
            error!("Invalid database path {db_path_str}: {e}");
            DatabaseError::FileCreationError(e.to_string())
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}
