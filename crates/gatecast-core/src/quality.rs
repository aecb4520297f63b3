//! Data-quality observability for the normalization layer
//!
//! Bad telemetry is clamped or defaulted so the dashboard never crashes, but
//! every such decision is recorded here: per call in a [`DataQualityReport`],
//! cumulatively in injectable [`QualityCounters`], and as a structured
//! `tracing` event on the `gatecast::quality` target.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::ErrorSeverity;

/// Tracing target for every data-quality event
pub const QUALITY_TARGET: &str = "gatecast::quality";

/// Why a value was clamped, defaulted or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampReason {
    /// `pred` was a negative number
    NegativePred,
    /// `pred` was a string, bool, array or object
    NonNumericPred,
    /// `pred` was null or absent
    MissingPred,
    /// `pred` was NaN or infinite
    NonFinitePred,
    /// Payload was expected to be an array
    NonArrayPayload,
    /// Array element was not an object
    NonObjectRecord,
    /// `move_type` was neither IN nor OUT
    UnknownMoveType,
    /// Record could not be converted to a typed point
    InvalidRecord,
}

impl ClampReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClampReason::NegativePred => "negative_pred",
            ClampReason::NonNumericPred => "non_numeric_pred",
            ClampReason::MissingPred => "missing_pred",
            ClampReason::NonFinitePred => "non_finite_pred",
            ClampReason::NonArrayPayload => "non_array_payload",
            ClampReason::NonObjectRecord => "non_object_record",
            ClampReason::UnknownMoveType => "unknown_move_type",
            ClampReason::InvalidRecord => "invalid_record",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClampReason::NonArrayPayload | ClampReason::InvalidRecord => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }
}

impl fmt::Display for ClampReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single clamp/default decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityEvent {
    pub reason: ClampReason,
    /// Index of the offending record, when the payload was an array
    pub index: Option<usize>,
    pub detail: String,
}

/// Report of everything defaulted while normalizing one payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    pub events: Vec<QualityEvent>,
    pub records_seen: usize,
}

impl DataQualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and emit it as a structured log line
    pub fn record(&mut self, reason: ClampReason, index: Option<usize>, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(
            target: QUALITY_TARGET,
            reason = reason.as_str(),
            index = ?index,
            detail = %detail,
            "Value defaulted"
        );
        self.events.push(QualityEvent {
            reason,
            index,
            detail,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns true if any record or payload was dropped
    pub fn has_errors(&self) -> bool {
        self.events
            .iter()
            .any(|e| e.reason.severity() == ErrorSeverity::Error)
    }

    pub fn count(&self, reason: ClampReason) -> usize {
        self.events.iter().filter(|e| e.reason == reason).count()
    }

    /// Returns (warnings, errors)
    pub fn severity_count(&self) -> (usize, usize) {
        let errors = self
            .events
            .iter()
            .filter(|e| e.reason.severity() == ErrorSeverity::Error)
            .count();
        (self.events.len() - errors, errors)
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: DataQualityReport) {
        self.events.extend(other.events);
        self.records_seen += other.records_seen;
    }

    /// Push every event into the cumulative counters
    pub fn flush_into(&self, counters: &QualityCounters) {
        for event in &self.events {
            counters.increment(event.reason);
        }
    }
}

/// Cumulative per-reason counters, shared across fetches
///
/// Cheap to clone; clones share the same counts.
#[derive(Debug, Clone, Default)]
pub struct QualityCounters {
    counts: Arc<DashMap<ClampReason, u64>>,
}

impl QualityCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, reason: ClampReason) {
        self.add(reason, 1);
    }

    /// Add `count` occurrences; zero leaves the counters untouched
    pub fn add(&self, reason: ClampReason, count: u64) {
        if count > 0 {
            *self.counts.entry(reason).or_insert(0) += count;
        }
    }

    pub fn get(&self, reason: ClampReason) -> u64 {
        self.counts.get(&reason).map(|c| *c).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    /// Counts sorted by reason, zero entries omitted
    pub fn snapshot(&self) -> Vec<(ClampReason, u64)> {
        let mut counts: Vec<(ClampReason, u64)> = self
            .counts
            .iter()
            .filter(|entry| *entry.value() > 0)
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        counts.sort_by_key(|(reason, _)| *reason);
        counts
    }

    pub fn reset(&self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_severity_counting() {
        let mut report = DataQualityReport::new();
        report.record(ClampReason::NegativePred, Some(1), "-50");
        report.record(ClampReason::MissingPred, Some(2), "absent");
        report.record(ClampReason::NonArrayPayload, None, "object");

        assert_eq!(report.severity_count(), (2, 1));
        assert!(report.has_errors());
        assert_eq!(report.count(ClampReason::NegativePred), 1);
    }

    #[test]
    fn test_report_merge() {
        let mut first = DataQualityReport::new();
        first.records_seen = 3;
        first.record(ClampReason::NonFinitePred, Some(0), "NaN");

        let mut second = DataQualityReport::new();
        second.records_seen = 4;

        first.merge(second);
        assert_eq!(first.records_seen, 7);
        assert_eq!(first.events.len(), 1);
        assert!(!first.has_errors());
    }

    #[test]
    fn test_counters_shared_between_clones() {
        let counters = QualityCounters::new();
        let clone = counters.clone();

        let mut report = DataQualityReport::new();
        report.record(ClampReason::NegativePred, Some(0), "-1");
        report.record(ClampReason::NegativePred, Some(1), "-2");
        report.record(ClampReason::UnknownMoveType, Some(2), "TRANSFER");
        report.flush_into(&clone);

        assert_eq!(counters.get(ClampReason::NegativePred), 2);
        assert_eq!(counters.total(), 3);
        assert_eq!(
            counters.snapshot(),
            vec![
                (ClampReason::NegativePred, 2),
                (ClampReason::UnknownMoveType, 1)
            ]
        );

        counters.reset();
        assert_eq!(clone.total(), 0);
    }
}
