//! Capacity utilization against a per-hour threshold

use gatecast_types::{ForecastPoint, Predicted};
use serde::Serialize;

use crate::format::round_to;
use crate::validate::sanitize_pred;

/// Utilization summary of an hourly series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityMetrics {
    /// Hours strictly above capacity
    pub overload_hours: usize,
    /// Highest `pred / capacity`, 2 decimals
    pub max_utilization: f64,
    /// Mean `pred / capacity`, 2 decimals
    pub avg_utilization: f64,
}

impl CapacityMetrics {
    pub fn is_overloaded(&self) -> bool {
        self.overload_hours > 0
    }
}

/// Utilization of a series against `capacity`.
///
/// Empty input or a capacity that is not strictly positive yields all zeros.
/// Non-finite or negative preds count as 0.
pub fn calculate_capacity_metrics<P: Predicted>(data: &[P], capacity: f64) -> CapacityMetrics {
    if data.is_empty() || !(capacity > 0.0) {
        return CapacityMetrics::default();
    }

    let mut overload_hours = 0;
    let mut max_utilization = 0.0f64;
    let mut sum_utilization = 0.0;

    for point in data {
        let pred = sanitize_pred(point.pred());
        let utilization = pred / capacity;
        if pred > capacity {
            overload_hours += 1;
        }
        max_utilization = max_utilization.max(utilization);
        sum_utilization += utilization;
    }

    CapacityMetrics {
        overload_hours,
        max_utilization: round_to(max_utilization, 2),
        avg_utilization: round_to(sum_utilization / data.len() as f64, 2),
    }
}

/// Number of hours with `pred > capacity`, without the positivity guard.
///
/// A zero capacity therefore flags every non-empty hour.
pub fn overload_count<P: Predicted>(data: &[P], capacity: f64) -> usize {
    data.iter()
        .filter(|p| sanitize_pred(p.pred()) > capacity)
        .count()
}

/// Highest `pred`, 0 for empty input
pub fn calculate_peak_hour<P: Predicted>(data: &[P]) -> f64 {
    data.iter()
        .map(|p| sanitize_pred(p.pred()))
        .fold(0.0, f64::max)
}

/// Sum of `pred`
pub fn calculate_total_volume<P: Predicted>(data: &[P]) -> f64 {
    data.iter().map(|p| sanitize_pred(p.pred())).sum()
}

/// Point with the largest `pred`; the earliest wins ties
pub fn peak_point(points: &[ForecastPoint]) -> Option<&ForecastPoint> {
    points.iter().fold(None, |best: Option<&ForecastPoint>, p| match best {
        Some(b) if sanitize_pred(p.pred) <= sanitize_pred(b.pred) => Some(b),
        _ => Some(p),
    })
}
