//! Timestamp and calendar-date utilities
//!
//! Readings are stamped by SQLite's `datetime('now')`, which is UTC, so
//! "today" is always the UTC calendar date.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Date format used by filters and `date(time)` in SQL
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date as supplied by clients
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidQueryFilter(format!("date '{}' is not YYYY-MM-DD", s)))
}

/// Render a date the way SQLite's `date()` does
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
