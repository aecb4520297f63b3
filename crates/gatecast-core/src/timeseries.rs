//! Hourly time-series helpers
//!
//! Gap-free hourly bucketing of sparse `(date, hour)` forecasts. Hour steps
//! use chrono calendar arithmetic so day, month and year boundaries roll over
//! correctly.

use chrono::{
    DateTime, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeDelta, TimeZone, Timelike,
    Utc,
};
use gatecast_types::{Predicted, TimePoint};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::validate::sanitize_pred;

/// Naive formats accepted for start timestamps, tried in order
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Upper bound on the up-front allocation for a series, one leap year
const MAX_PREALLOCATED_HOURS: usize = 24 * 366;

/// One bucket of a zero-filled hourly series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroFilledHour {
    /// RFC 3339 timestamp of the bucket start
    pub ts: String,
    /// Wall-clock hour of day (0-23) in the series' offset
    pub hour: u8,
    pub pred: f64,
}

impl Predicted for ZeroFilledHour {
    fn pred(&self) -> f64 {
        self.pred
    }
}

/// Parse an RFC 3339 timestamp, or a naive one interpreted as UTC wall clock
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, CoreError> {
    parse_timestamp_with_offset(value, Utc.fix())
}

/// Parse an RFC 3339 timestamp, or a naive one interpreted in `offset`
pub fn parse_timestamp_with_offset(
    value: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, CoreError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| CoreError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Drop minutes, seconds and sub-seconds
pub fn truncate_to_hour(dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    dt.with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// `count` consecutive hour starts beginning at the hour containing `start`
pub fn next_n_hours(start: DateTime<FixedOffset>, count: usize) -> Vec<DateTime<FixedOffset>> {
    let first = truncate_to_hour(start);
    (0..count)
        .map_while(|i| {
            let step = TimeDelta::try_hours(i as i64)?;
            first.checked_add_signed(step)
        })
        .collect()
}

/// Produce exactly `hour_count` hourly buckets from `start_ts`.
///
/// Sparse rows are keyed by `(date, hour)`; duplicate keys are summed, not
/// overwritten, so the input need not be pre-aggregated by move type or
/// designation. Hours missing from `data` get `pred = 0`.
///
/// # Errors
/// `CoreError::InvalidTimestamp` if `start_ts` does not parse.
pub fn zero_fill_hours(
    start_ts: &str,
    hour_count: usize,
    data: &[TimePoint],
) -> Result<Vec<ZeroFilledHour>, CoreError> {
    let start = parse_timestamp(start_ts)?;
    zero_fill_from(start, hour_count, data)
}

/// Typed variant of [`zero_fill_hours`]
pub fn zero_fill_from(
    start: DateTime<FixedOffset>,
    hour_count: usize,
    data: &[TimePoint],
) -> Result<Vec<ZeroFilledHour>, CoreError> {
    let mut by_hour: HashMap<(String, u8), f64> = HashMap::with_capacity(data.len());
    for point in data {
        *by_hour
            .entry((point.date.clone(), point.hour))
            .or_insert(0.0) += sanitize_pred(point.pred);
    }

    let overflow = || CoreError::InvalidWindow {
        reason: format!("{hour_count} hours from {start} overflows the calendar"),
    };
    i64::try_from(hour_count)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|span| start.checked_add_signed(span))
        .ok_or_else(overflow)?;

    let mut out = Vec::with_capacity(hour_count.min(MAX_PREALLOCATED_HOURS));
    for i in 0..hour_count {
        let current = TimeDelta::try_hours(i as i64)
            .and_then(|step| start.checked_add_signed(step))
            .ok_or_else(overflow)?;

        let date = current.format("%Y-%m-%d").to_string();
        let hour = current.hour() as u8;
        let ts = current.to_rfc3339_opts(SecondsFormat::Secs, true);
        let pred = by_hour.get(&(date, hour)).copied().unwrap_or(0.0);

        out.push(ZeroFilledHour { ts, hour, pred });
    }

    Ok(out)
}

/// 24-slot hour-of-day profile, summing `pred` across dates
pub fn hour_of_day_profile(data: &[TimePoint]) -> [f64; 24] {
    let mut profile = [0.0; 24];
    for point in data {
        if let Some(slot) = profile.get_mut(point.hour as usize) {
            *slot += sanitize_pred(point.pred);
        }
    }
    profile
}
