//! Regroup flat readings into per-key series
//!
//! Grouping is adjacent-only: input must already be ordered by key (the store
//! queries with `ORDER BY key, time, id`). A key that shows up again after
//! its run ended means the input was not key-ordered, and is reported as an
//! error rather than producing two series for the same key.

use sensorlog_common::db::{Reading, Series};
use sensorlog_common::{Error, Result};
use std::collections::HashSet;

pub fn group_series<I>(readings: I) -> Result<Vec<Series>>
where
    I: IntoIterator<Item = Reading>,
{
    let mut series: Vec<Series> = Vec::new();
    let mut closed: HashSet<String> = HashSet::new();

    for reading in readings {
        if let Some(current) = series.last_mut() {
            if current.key == reading.key {
                current.push(reading.value, reading.time);
                continue;
            }
            closed.insert(current.key.clone());
        }

        if closed.contains(&reading.key) {
            return Err(Error::Internal(format!(
                "readings for key '{}' are not contiguous",
                reading.key
            )));
        }

        let mut next = Series::new(reading.key);
        next.push(reading.value, reading.time);
        series.push(next);
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(10, 0, sec)
            .unwrap()
    }

    fn reading(id: i64, key: &str, value: f64) -> Reading {
        Reading {
            id,
            time: at(id as u32),
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_series(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_groups_preserve_order() {
        let rows = vec![
            reading(1, "A", 1.0),
            reading(2, "A", 2.0),
            reading(3, "B", 10.0),
            reading(4, "B", 5.0),
            reading(5, "B", 7.5),
        ];

        let series = group_series(rows).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].key, "A");
        assert_eq!(series[0].values, vec![1.0, 2.0]);
        assert_eq!(series[0].timestamps, vec![at(1), at(2)]);
        assert_eq!(series[1].key, "B");
        assert_eq!(series[1].values, vec![10.0, 5.0, 7.5]);
    }

    #[test]
    fn test_non_contiguous_keys_rejected() {
        let rows = vec![
            reading(1, "A", 1.0),
            reading(2, "B", 2.0),
            reading(3, "A", 3.0),
        ];

        let err = group_series(rows).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
