//! Query filters for reading retrieval
//!
//! Only `key` and `date` are recognized. Anything else is rejected before a
//! query is built, so a typo never silently turns into an unfiltered scan.

use chrono::NaiveDate;
use sensorlog_common::time::{format_date, parse_date};
use sensorlog_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite};

pub const FILTER_KEY: &str = "key";
pub const FILTER_DATE: &str = "date";

/// Conjunction of optional filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Exact key match
    pub key: Option<String>,
    /// Calendar date of `time` (UTC)
    pub date: Option<NaiveDate>,
}

impl QueryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Build a filter from raw name/value pairs (e.g. URL query parameters)
    ///
    /// Empty values count as absent. Unknown names, repeated names and
    /// malformed dates are `InvalidQueryFilter`.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = QueryFilter::default();
        let mut seen_key = false;
        let mut seen_date = false;

        for (name, value) in params {
            let (name, value) = (name.as_ref(), value.as_ref());
            let seen = match name {
                FILTER_KEY => &mut seen_key,
                FILTER_DATE => &mut seen_date,
                other => {
                    return Err(Error::InvalidQueryFilter(format!(
                        "unknown filter '{}' (allowed: {}, {})",
                        other, FILTER_KEY, FILTER_DATE
                    )))
                }
            };
            if std::mem::replace(seen, true) {
                return Err(Error::InvalidQueryFilter(format!(
                    "filter '{}' given more than once",
                    name
                )));
            }
            if value.is_empty() {
                continue;
            }
            match name {
                FILTER_KEY => filter.key = Some(value.to_string()),
                _ => filter.date = Some(parse_date(value)?),
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.date.is_none()
    }

    /// Append `WHERE ...` for the active filters, binding every value
    pub(crate) fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if self.is_empty() {
            return;
        }

        let mut first = true;
        let mut next = |builder: &mut QueryBuilder<'_, Sqlite>| {
            builder.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some(key) = &self.key {
            next(builder);
            builder.push("key = ").push_bind(key.clone());
        }
        if let Some(date) = self.date {
            next(builder);
            builder.push("date(time) = ").push_bind(format_date(date));
        }
    }
}
