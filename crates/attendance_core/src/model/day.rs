//! Date coercion and local day boundaries.
//!
//! # Responsibility
//! - Accept attendance dates as structured values or text and normalize
//!   them to offset-carrying timestamps.
//! - Compute the inclusive local-day window used by absentee queries.
//!
//! # Invariants
//! - Date-only and naive text is interpreted in the local time zone.
//! - Day windows are compared on epoch milliseconds so every backend
//!   agrees on the boundary.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A date supplied by a caller, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Timestamp(DateTime<FixedOffset>),
    Day(NaiveDate),
    Text(String),
}

/// Text that is not an accepted date form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    input: String,
}

impl DateParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized date `{}`; expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD",
            self.input
        )
    }
}

impl Error for DateParseError {}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        Self::Timestamp(value.fixed_offset())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        Self::Day(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl DateInput {
    /// Normalizes the input to the timestamp that gets stored.
    ///
    /// Calendar days become local midnight.
    pub fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, DateParseError> {
        match self {
            Self::Timestamp(value) => Ok(*value),
            Self::Day(day) => Ok(local_midnight(*day)),
            Self::Text(text) => parse_date_text(text),
        }
    }

    /// Reduces the input to the local calendar day it falls on.
    pub fn to_local_day(&self) -> Result<NaiveDate, DateParseError> {
        match self {
            Self::Timestamp(value) => Ok(local_day_of(value)),
            Self::Day(day) => Ok(*day),
            Self::Text(text) => {
                let trimmed = text.trim();
                if let Ok(day) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
                    return Ok(day);
                }
                parse_date_text(trimmed).map(|value| local_day_of(&value))
            }
        }
    }
}

/// Parses caller text into a timestamp.
///
/// Accepted forms, in order: RFC 3339 with offset, naive local date-time,
/// date only (local midnight).
pub fn parse_date_text(text: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(text));
    }

    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(value);
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(local_timestamp(naive));
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(local_midnight)
        .map_err(|_| DateParseError::new(text))
}

/// Returns the local calendar day a timestamp falls on.
pub fn local_day_of(value: &DateTime<FixedOffset>) -> NaiveDate {
    value.with_timezone(&Local).date_naive()
}

/// Resolves local wall-clock time, taking the earlier instant on DST folds.
fn local_timestamp(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|value| value.fixed_offset())
        // Skipped wall-clock time (DST gap): read it as UTC.
        .unwrap_or_else(|| Local.from_utc_datetime(&naive).fixed_offset())
}

fn local_midnight(day: NaiveDate) -> DateTime<FixedOffset> {
    local_timestamp(day.and_time(NaiveTime::MIN))
}

/// Inclusive `[start, end]` window covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub day: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DayRange {
    /// Local `00:00:00.000` through local `23:59:59.999`.
    pub fn local(day: NaiveDate) -> Self {
        let start = local_midnight(day);
        let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .map(|time| {
                Local
                    .from_local_datetime(&day.and_time(time))
                    .latest()
                    .map(|value| value.fixed_offset())
                    .unwrap_or_else(|| Local.from_utc_datetime(&day.and_time(time)).fixed_offset())
            })
            .unwrap_or(start);
        Self { day, start, end }
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    pub fn contains(&self, value: &DateTime<FixedOffset>) -> bool {
        let millis = value.timestamp_millis();
        millis >= self.start_millis() && millis <= self.end_millis()
    }
}
