//! API boundary validation
//!
//! Raw JSON from the forecasting backend is loosely typed: `pred` may be
//! negative, null, a string, or missing entirely. Everything is normalized
//! here once, so downstream metrics can assume a finite non-negative `pred`.
//!
//! # Graceful Degradation
//! - Non-array payload: empty result, logged as a warning
//! - Invalid `pred`: defaulted to 0, recorded in the quality report
//! - Untypeable record (typed parsers only): skipped, recorded as an error

use chrono::NaiveDate;
use gatecast_types::{ForecastPoint, Predicted, TimePoint};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::quality::{ClampReason, DataQualityReport, QualityCounters, QUALITY_TARGET};

/// One API record with a guaranteed finite, non-negative `pred`.
///
/// All other fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub pred: f64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NormalizedPoint {
    /// Look up a passthrough field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Rebuild the JSON object, `pred` included
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        let pred = serde_json::Number::from_f64(self.pred)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0));
        object.insert("pred".to_string(), pred);
        Value::Object(object)
    }
}

impl Predicted for NormalizedPoint {
    fn pred(&self) -> f64 {
        self.pred
    }
}

/// Clamp an already-typed quantity: negatives and non-finite values become 0
pub fn sanitize_pred(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// [`sanitize_pred`] that records the clamp in `report`
pub fn sanitize_reported(
    value: f64,
    report: &mut DataQualityReport,
    index: Option<usize>,
) -> f64 {
    let reason = if !value.is_finite() {
        ClampReason::NonFinitePred
    } else if value < 0.0 {
        ClampReason::NegativePred
    } else {
        return value;
    };
    report.record(reason, index, value.to_string());
    0.0
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerce a raw `pred` field, returning the reason when it had to be defaulted
fn coerce_pred(raw: Option<&Value>) -> (f64, Option<ClampReason>) {
    match raw {
        None | Some(Value::Null) => (0.0, Some(ClampReason::MissingPred)),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if !v.is_finite() => (0.0, Some(ClampReason::NonFinitePred)),
            Some(v) if v < 0.0 => (0.0, Some(ClampReason::NegativePred)),
            Some(v) => (v, None),
            None => (0.0, Some(ClampReason::NonFinitePred)),
        },
        Some(_) => (0.0, Some(ClampReason::NonNumericPred)),
    }
}

/// Normalize a payload and return the per-call quality report
pub fn normalize_payload(data: &Value) -> (Vec<NormalizedPoint>, DataQualityReport) {
    let mut report = DataQualityReport::new();

    let Value::Array(items) = data else {
        tracing::warn!(
            target: QUALITY_TARGET,
            got = json_type_name(data),
            "Invalid API data: expected array"
        );
        report.record(ClampReason::NonArrayPayload, None, json_type_name(data));
        return (Vec::new(), report);
    };

    report.records_seen = items.len();
    let points = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let Value::Object(object) = item else {
                report.record(
                    ClampReason::NonObjectRecord,
                    Some(idx),
                    json_type_name(item),
                );
                return NormalizedPoint {
                    pred: 0.0,
                    fields: Map::new(),
                };
            };

            let raw = object.get("pred");
            let (pred, reason) = coerce_pred(raw);
            if let Some(reason) = reason {
                let detail = raw.map(Value::to_string).unwrap_or_else(|| "absent".to_string());
                report.record(reason, Some(idx), detail);
            }

            let mut fields = object.clone();
            fields.remove("pred");
            NormalizedPoint { pred, fields }
        })
        .collect();

    (points, report)
}

fn log_summary(report: &DataQualityReport) {
    if !report.is_clean() {
        let (warnings, errors) = report.severity_count();
        tracing::warn!(
            target: QUALITY_TARGET,
            records = report.records_seen,
            defaulted = warnings,
            dropped = errors,
            "API payload required normalization"
        );
    }
}

/// Validate an arbitrary API response.
///
/// Arrays come back with the same length and shape, `pred` coerced to a
/// finite non-negative number. Anything else yields an empty vector.
pub fn validate_api_data(data: &Value) -> Vec<NormalizedPoint> {
    let (points, report) = normalize_payload(data);
    log_summary(&report);
    points
}

/// Same as [`validate_api_data`], also feeding the cumulative counters
pub fn validate_api_data_with(data: &Value, counters: &QualityCounters) -> Vec<NormalizedPoint> {
    let (points, report) = normalize_payload(data);
    log_summary(&report);
    report.flush_into(counters);
    points
}

/// Normalize then deserialize each record into `T`.
///
/// Records that still fail to deserialize are skipped and reported.
pub fn parse_records<T: DeserializeOwned>(data: &Value) -> (Vec<T>, DataQualityReport) {
    let (indexed, report) = parse_indexed::<T>(data);
    log_summary(&report);
    (indexed.into_iter().map(|(_, record)| record).collect(), report)
}

/// Parsed records paired with their index in the original payload
fn parse_indexed<T: DeserializeOwned>(data: &Value) -> (Vec<(usize, T)>, DataQualityReport) {
    let (points, mut report) = normalize_payload(data);

    let mut parsed = Vec::with_capacity(points.len());
    for (idx, point) in points.into_iter().enumerate() {
        match serde_json::from_value::<T>(point.to_value()) {
            Ok(record) => parsed.push((idx, record)),
            Err(e) => report.record(ClampReason::InvalidRecord, Some(idx), e.to_string()),
        }
    }

    (parsed, report)
}

/// Typed parse of `{date, hour, pred, move_type?, desig?}` records.
///
/// Additionally rejects hours outside 0-23 and dates that are not YYYY-MM-DD.
/// Reported indices refer to positions in `data`.
pub fn parse_time_points(data: &Value) -> (Vec<TimePoint>, DataQualityReport) {
    let (points, mut report) = parse_indexed::<TimePoint>(data);

    let mut valid = Vec::with_capacity(points.len());
    for (idx, point) in points {
        if point.hour > 23 {
            report.record(
                ClampReason::InvalidRecord,
                Some(idx),
                format!("hour {} out of range", point.hour),
            );
            continue;
        }
        if NaiveDate::parse_from_str(&point.date, "%Y-%m-%d").is_err() {
            report.record(
                ClampReason::InvalidRecord,
                Some(idx),
                format!("bad date '{}'", point.date),
            );
            continue;
        }
        valid.push(point);
    }

    log_summary(&report);
    (valid, report)
}

/// Typed parse of `{ts, pred, actual?, lower?, upper?}` records
pub fn parse_forecast_points(data: &Value) -> (Vec<ForecastPoint>, DataQualityReport) {
    parse_records::<ForecastPoint>(data)
}
