//! SQLite persistence for host samples.
//!
//! The store is a single append-only table, `system_metrics`. Pools open
//! the database file in WAL mode so dashboard readers can query while a
//! collection cycle is inserting.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS system_metrics ( \
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        timestamp DATETIME NOT NULL DEFAULT (datetime('now', 'localtime')), \
        cpu_percent REAL NOT NULL, \
        cpu_time_user REAL NOT NULL, \
        cpu_time_system REAL NOT NULL, \
        cpu_time_idle REAL NOT NULL, \
        mem_total INTEGER NOT NULL, \
        mem_avail INTEGER NOT NULL, \
        mem_used INTEGER NOT NULL, \
        mem_percent REAL NOT NULL, \
        battery_percent REAL, \
        charger_plugged INTEGER, \
        battery_time_left INTEGER \
    )";

/// `latest()` and the chart windows order by `(timestamp, id)`; the id
/// breaks ties between rows written within the same second.
const CREATE_TIMESTAMP_INDEX: &str = "\
    CREATE INDEX IF NOT EXISTS idx_system_metrics_timestamp \
    ON system_metrics (timestamp, id)";

/// Open (creating if missing) the SQLite database at `path`.
pub async fn create_pool(path: impl AsRef<Path>) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
}

/// Create the `system_metrics` table and its index if they do not exist.
///
/// Safe to call on every process start.
pub async fn initialize(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_TIMESTAMP_INDEX).execute(pool).await?;
    tracing::debug!("system_metrics schema ensured");
    Ok(())
}
