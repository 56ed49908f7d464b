//! Session key allocation
//!
//! A live session records under a single-letter key that is fresh for the
//! current UTC day: "A" for the first session, then the character after the
//! largest key already used. Keys are treated as single characters; a
//! multi-character key recorded today (e.g. via `/save/temp/..`) makes
//! allocation fail instead of guessing a successor.

use chrono::NaiveDate;
use sensorlog_common::{Error, Result};
use std::collections::BTreeSet;
use tokio::sync::{Mutex, MutexGuard};

pub const FIRST_KEY: &str = "A";

/// Successor of the largest used key, or `FIRST_KEY` when none were used
pub fn next_key<'a, I>(used: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(max) = used.into_iter().max() else {
        return Ok(FIRST_KEY.to_string());
    };

    let mut chars = max.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(Error::KeyAllocation(format!(
            "key '{}' used today is not a single character",
            max
        )));
    };

    char::from_u32(c as u32 + 1)
        .map(String::from)
        .ok_or_else(|| Error::KeyAllocation(format!("no key follows '{}'", c)))
}

/// Keys handed out by this process on one UTC day
#[derive(Debug)]
pub struct Reservations {
    date: NaiveDate,
    keys: BTreeSet<String>,
}

impl Reservations {
    /// Drop reservations from a previous day
    pub fn roll_to(&mut self, date: NaiveDate) {
        if self.date != date {
            self.date = date;
            self.keys.clear();
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn insert(&mut self, key: String) {
        self.keys.insert(key);
    }
}

/// Serializes allocation so concurrent sessions never share a key
///
/// Holding the guard across the "read today's keys" query and the reservation
/// closes the window where two sessions both see the same maximum key before
/// either has written a row.
#[derive(Debug)]
pub struct KeyAllocator {
    reservations: Mutex<Reservations>,
}

impl KeyAllocator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            reservations: Mutex::new(Reservations {
                date: today,
                keys: BTreeSet::new(),
            }),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Reservations> {
        self.reservations.lock().await
    }
}
