//! Record store over the readings table
//!
//! Rows are append-only: `save` inserts with a server-side timestamp and
//! nothing updates or deletes them. Retrieval is always key-major
//! (`ORDER BY key, time, id`) so series grouping sees each key as one run.

use chrono::NaiveDate;
use sensorlog_common::config::is_valid_table_name;
use sensorlog_common::db::{Reading, Series};
use sensorlog_common::time::{format_date, today};
use sensorlog_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

pub mod filter;
pub mod keys;
pub mod series;

pub use filter::QueryFilter;
pub use keys::{next_key, KeyAllocator};
pub use series::group_series;

#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    table: Arc<str>,
    allocator: Arc<KeyAllocator>,
}

impl RecordStore {
    /// Wrap an initialized pool; the table must already exist
    pub fn new(pool: SqlitePool, table: &str) -> Result<Self> {
        if !is_valid_table_name(table) {
            return Err(Error::Config(format!("Invalid table name: {}", table)));
        }
        Ok(Self {
            pool,
            table: Arc::from(table),
            allocator: Arc::new(KeyAllocator::new(today())),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert one reading stamped with SQLite's current UTC time
    pub async fn save(&self, key: &str, value: f64) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidInput("key must not be empty".to_string()));
        }
        if !value.is_finite() {
            return Err(Error::InvalidInput(format!("value must be finite, got {}", value)));
        }

        sqlx::query(&format!(
            "INSERT INTO {} (time, key, value) VALUES (datetime('now'), ?, ?)",
            self.table
        ))
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!("Saved {} = {}", key, value);
        Ok(())
    }

    /// Flat readings matching the filter, key-major
    pub async fn readings(&self, filter: &QueryFilter) -> Result<Vec<Reading>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT id, time, key, value FROM {}", self.table));
        filter.push_where(&mut builder);
        builder.push(" ORDER BY key, time, id");

        let rows = builder
            .build_query_as::<Reading>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Readings matching the filter, grouped into one series per key
    pub async fn query(&self, filter: &QueryFilter) -> Result<Vec<Series>> {
        let rows = self.readings(filter).await?;
        group_series(rows)
    }

    /// Distinct keys with at least one reading on `date`
    pub async fn get_keys(&self, date: NaiveDate) -> Result<BTreeSet<String>> {
        let keys: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT key FROM {} WHERE date(time) = ? ORDER BY key",
            self.table
        ))
        .bind(format_date(date))
        .fetch_all(&self.pool)
        .await?;

        Ok(keys.into_iter().collect())
    }

    /// Allocate a fresh single-letter key for a live session
    ///
    /// Considers keys persisted today plus keys this process already handed
    /// out today, under one lock.
    pub async fn generate_key(&self) -> Result<String> {
        let mut reserved = self.allocator.lock().await;
        let date = today();
        reserved.roll_to(date);

        let persisted = self.get_keys(date).await?;
        let key = next_key(
            persisted
                .iter()
                .map(String::as_str)
                .chain(reserved.keys()),
        )?;
        reserved.insert(key.clone());

        info!("Allocated session key {}", key);
        Ok(key)
    }

    /// Number of readings stored under `key`
    pub async fn count(&self, key: &str) -> Result<i64> {
        let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE key = ?", self.table))
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
