//! Timestamp utilities
//!
//! Event dates are free-form text entered by users. Everything time-based in
//! the services goes through [`normalize`], which either yields a comparable
//! UTC instant or `None`. `None` means "leave this record out of the time
//! based computation"; it is never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Date-time shapes accepted without an explicit offset (read as UTC)
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-time shapes carrying an explicit offset, seconds optional
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M%:z",
];

const PLAIN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "now" for the services
///
/// Injected so that month filters and day windows can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Clock pinned to midnight UTC of `date` (`YYYY-MM-DD`)
    ///
    /// Returns `None` when `date` is not a plain calendar date.
    pub fn at_date(date: &str) -> Option<Self> {
        parse_plain_date(date).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render an instant the way the services stamp `created_at` / `updated_at`
pub fn stamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a possibly-absent date-like text into a UTC instant
///
/// Order of attempts:
/// 1. full ISO-8601 date-time (with or without offset) or date-only value
/// 2. the leading whitespace-delimited token as a plain `YYYY-MM-DD` date
///
/// Anything else yields `None`.
pub fn normalize(value: Option<&str>) -> Option<DateTime<Utc>> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    parse_strict(text).or_else(|| {
        text.split_whitespace()
            .next()
            .and_then(parse_plain_date)
    })
}

fn parse_strict(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Some(instant) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
    {
        return Some(instant.with_timezone(&Utc));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| parse_plain_date(text))
}

fn parse_plain_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text, PLAIN_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
