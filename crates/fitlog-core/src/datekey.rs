//! Canonical calendar-day keys
//!
//! Every date-bearing value is reduced to the calendar date it was written in.
//! Offsets and times of day are dropped, never converted, so a late-evening
//! entry at `+02:00` and an early-morning entry at `-05:00` land on the same day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const KEY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn pred(self) -> Option<DateKey> {
        self.0.pred_opt().map(DateKey)
    }

    pub fn succ(self) -> Option<DateKey> {
        self.0.succ_opt().map(DateKey)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize(raw.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Anything that carries at least a year, month and day.
pub trait DateLike {
    /// The calendar date as written, ignoring time of day and offset.
    fn local_date(&self) -> Result<NaiveDate>;
}

impl DateLike for str {
    fn local_date(&self) -> Result<NaiveDate> {
        parse_local_date(self).ok_or_else(|| Error::InvalidDateInput {
            input: self.to_string(),
        })
    }
}

impl DateLike for String {
    fn local_date(&self) -> Result<NaiveDate> {
        self.as_str().local_date()
    }
}

impl DateLike for NaiveDate {
    fn local_date(&self) -> Result<NaiveDate> {
        Ok(*self)
    }
}

impl DateLike for NaiveDateTime {
    fn local_date(&self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl<Tz: TimeZone> DateLike for DateTime<Tz> {
    fn local_date(&self) -> Result<NaiveDate> {
        Ok(self.date_naive())
    }
}

/// Reduce a date-like value to its canonical day key.
pub fn normalize<D: DateLike + ?Sized>(value: &D) -> Result<DateKey> {
    value.local_date().map(DateKey)
}

fn parse_local_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, KEY_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    leading_date(trimmed)
}

// Postgres-style "2024-03-15 23:00:00+02" and similar: trust the date prefix
// when it is followed by a time separator.
fn leading_date(input: &str) -> Option<NaiveDate> {
    let head = input.get(..10)?;
    let rest = input.get(10..)?;
    if !rest.starts_with(['T', 't', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(head, KEY_FORMAT).ok()
}
