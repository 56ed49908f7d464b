//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One persisted row of the readings table
///
/// `time` is assigned by SQLite at insert (UTC, second precision).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub time: NaiveDateTime,
    pub key: String,
    pub value: f64,
}

/// All readings of one key as parallel value/timestamp sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    pub values: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
}

impl Series {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64, timestamp: NaiveDateTime) {
        self.values.push(value);
        self.timestamps.push(timestamp);
    }
}
