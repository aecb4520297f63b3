//! Dashboard query state and time windows
//!
//! Filters and view mode are an explicit value passed to whatever renders or
//! fetches, instead of being read from ambient URL state.

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::timeseries::{parse_timestamp, truncate_to_hour};

/// Filter value meaning "no filter"
pub const ALL: &str = "ALL";

/// Hours covered by the rolling live window
pub const LIVE_WINDOW_HOURS: i64 = 8;

/// Format of window bounds sent to the API
const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:00";

/// Which window the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Rolling 8 hours from the current hour
    #[default]
    Next8h,
    /// Midnight to 23:00 of the current day
    Today,
    /// User supplied start/end
    #[serde(alias = "range")]
    Custom,
}

impl ViewMode {
    /// Parse a mode string. `"range"` is accepted for old links; anything
    /// unrecognised falls back to next 8h.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" => ViewMode::Today,
            "custom" | "range" => ViewMode::Custom,
            _ => ViewMode::Next8h,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Next8h => "next8h",
            ViewMode::Today => "today",
            ViewMode::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Next8h => "Next 8 hours",
            ViewMode::Today => "Today",
            ViewMode::Custom => "Custom range",
        }
    }

    /// Live modes keep refreshing, custom windows are fetched once
    pub fn is_live(&self) -> bool {
        matches!(self, ViewMode::Next8h | ViewMode::Today)
    }

    /// Polling period for this mode, `None` when it should not refresh
    pub fn refetch_interval(&self, every: Duration) -> Option<Duration> {
        self.is_live().then_some(every)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default refresh cadence of live modes
pub const DEFAULT_REFETCH: Duration = Duration::from_secs(60);

/// [`ViewMode::refetch_interval`] at the default cadence
pub fn refetch_interval(mode: ViewMode) -> Option<Duration> {
    mode.refetch_interval(DEFAULT_REFETCH)
}

/// `None` for the "no filter" values `ALL` and empty
pub fn filter_value(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(trimmed)
    }
}

/// Filters and window selection of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub terminal: String,
    pub move_type: String,
    pub desig: String,
    pub mode: ViewMode,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            terminal: "T1".to_string(),
            move_type: "IN".to_string(),
            desig: "EXP".to_string(),
            mode: ViewMode::Next8h,
            start: None,
            end: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DashboardQuery {
    /// Build from optional raw values, applying defaults and upper-casing
    pub fn new(
        terminal: Option<String>,
        move_type: Option<String>,
        desig: Option<String>,
        mode: Option<&str>,
        start: Option<String>,
        end: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        let upper = |value: Option<String>, fallback: String| {
            non_empty(value).unwrap_or(fallback).to_uppercase()
        };

        Self {
            terminal: upper(terminal, defaults.terminal),
            move_type: upper(move_type, defaults.move_type),
            desig: upper(desig, defaults.desig),
            mode: mode.map(ViewMode::parse).unwrap_or_default(),
            start: non_empty(start),
            end: non_empty(end),
        }
    }

    /// Build from `key=value` pairs as found in a dashboard link
    ///
    /// Recognised keys: `terminal`, `movetype`, `desig`, `mode`, `start`, `end`.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut terminal = None;
        let mut move_type = None;
        let mut desig = None;
        let mut mode = None;
        let mut start = None;
        let mut end = None;

        for (key, value) in params {
            let slot = match key.as_ref() {
                "terminal" => &mut terminal,
                "movetype" => &mut move_type,
                "desig" => &mut desig,
                "mode" => &mut mode,
                "start" => &mut start,
                "end" => &mut end,
                _ => continue,
            };
            *slot = Some(value.into());
        }

        Self::new(terminal, move_type, desig, mode.as_deref(), start, end)
    }

    /// Inverse of [`DashboardQuery::from_params`]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("terminal", self.terminal.clone()),
            ("movetype", self.move_type.clone()),
            ("desig", self.desig.clone()),
            ("mode", self.mode.as_str().to_string()),
        ];
        if let Some(start) = &self.start {
            params.push(("start", start.clone()));
        }
        if let Some(end) = &self.end {
            params.push(("end", end.clone()));
        }
        params
    }

    /// True when a custom window has both bounds
    pub fn has_custom_range(&self) -> bool {
        self.mode == ViewMode::Custom && self.start.is_some() && self.end.is_some()
    }
}

/// Start/end strings of the window sent to the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whole hours between start and end, `None` if either bound is unparseable
    /// or the window is reversed
    pub fn hours(&self) -> Option<u32> {
        let start = parse_timestamp(&self.start).ok()?;
        let end = parse_timestamp(&self.end).ok()?;
        u32::try_from((end - start).num_hours()).ok()
    }
}

fn window_bound(dt: DateTime<FixedOffset>) -> String {
    dt.format(WINDOW_FORMAT).to_string()
}

/// Rolling window starting at the hour containing `now`
pub fn next8h_window(now: DateTime<FixedOffset>) -> TimeWindow {
    let start = truncate_to_hour(now);
    let end = TimeDelta::try_hours(LIVE_WINDOW_HOURS)
        .and_then(|span| start.checked_add_signed(span))
        .unwrap_or(start);
    TimeWindow::new(window_bound(start), window_bound(end))
}

/// Midnight to 23:00 of the day containing `now`
pub fn today_window(now: DateTime<FixedOffset>) -> TimeWindow {
    let midnight = truncate_to_hour(now)
        .with_hour(0)
        .unwrap_or_else(|| truncate_to_hour(now));
    let last_hour = midnight.with_hour(23).unwrap_or(midnight);
    TimeWindow::new(window_bound(midnight), window_bound(last_hour))
}

/// Window for a query at wall-clock time `now`.
///
/// Custom windows are passed through verbatim; when either bound is missing
/// the rolling next-8h window is used instead.
pub fn compute_window(query: &DashboardQuery, now: DateTime<FixedOffset>) -> TimeWindow {
    match (query.mode, &query.start, &query.end) {
        (ViewMode::Custom, Some(start), Some(end)) => TimeWindow::new(start.clone(), end.clone()),
        (ViewMode::Today, _, _) => today_window(now),
        _ => next8h_window(now),
    }
}
