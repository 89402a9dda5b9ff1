//! Job fair details and the published date/time window.
//!
//! Interview slots must fall inside the window the organiser published
//! for the fair: between the first and last day, and between the daily
//! opening and closing times when those are set.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Date format used by the API and form inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted time formats, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::Validation(format!("Invalid date '{value}'. Expected YYYY-MM-DD")))
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time(value: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| CoreError::Validation(format!("Invalid time '{value}'. Expected HH:MM")))
}

/// Serde helper for required time fields in either accepted format.
pub(crate) fn time_field<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).map_err(D::Error::custom)
}

fn optional_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            parse_time(&raw).map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

/// A job fair as returned by `GET /job-fairs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFair {
    pub id: DbId,
    #[serde(alias = "name")]
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, deserialize_with = "optional_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "optional_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
}

impl JobFair {
    pub fn window(&self) -> JobFairWindow {
        JobFairWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            opens_at: self.start_time,
            closes_at: self.end_time,
        }
    }
}

/// The dates and daily hours during which interviews may be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFairWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opens_at: Option<NaiveTime>,
    pub closes_at: Option<NaiveTime>,
}

impl JobFairWindow {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Whether `[start, end]` lies within the daily opening hours.
    pub fn contains_times(&self, start: NaiveTime, end: NaiveTime) -> bool {
        let after_open = self.opens_at.map_or(true, |open| start >= open);
        let before_close = self.closes_at.map_or(true, |close| end <= close);
        after_open && before_close
    }
}
