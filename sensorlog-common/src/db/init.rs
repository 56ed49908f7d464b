//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and ensures the readings table
//! exists. There is no migration tooling: the schema is a single table that
//! is created if absent.

use crate::config::is_valid_table_name;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create the readings table if needed
pub async fn init_database(db_path: &Path, table: &str) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // WAL lets HTTP readers proceed while live sessions append
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_readings_table(&pool, table).await?;

    Ok(pool)
}

/// In-memory database on a single pinned connection
///
/// Every new connection to `sqlite::memory:` is a separate database, so the
/// pool must never open a second one or recycle the first.
pub async fn init_memory_database(table: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_readings_table(&pool, table).await?;

    Ok(pool)
}

/// Create the readings table and its lookup index (idempotent)
pub async fn create_readings_table(pool: &SqlitePool, table: &str) -> Result<()> {
    if !is_valid_table_name(table) {
        return Err(Error::Config(format!("Invalid table name: {}", table)));
    }

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY,
            time DATETIME,
            key TEXT,
            value REAL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_key_time ON {table} (key, time)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}
