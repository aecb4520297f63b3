//! Gate-token analytics over normalized forecast data
//!
//! Flow balance, capacity utilization, risk classification and the headline
//! summaries built on top of them. Every function here is pure and assumes
//! input that already went through [`crate::validate`], but still treats a
//! negative or non-finite `pred` as 0.

use chrono::{DateTime, Utc};
use gatecast_types::TimePoint;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod capacity;
pub mod flow;
pub mod insights;
pub mod risk;

#[cfg(test)]
mod tests;

pub use capacity::{
    calculate_capacity_metrics, calculate_peak_hour, calculate_total_volume, overload_count,
    peak_point, CapacityMetrics,
};
pub use flow::{
    calculate_flow_balance, calculate_flow_balance_with, dominant_move_type, hourly_flow_split,
    FlowBalance, FlowSample, HourlyFlow,
};
pub use insights::{
    all_zero, executive_summary, insight_lines, summarize_forecast, ForecastSummary, PeakHour,
};
pub use risk::{calculate_risk_level, RiskAssessment, RiskColor, RiskLevel};

use crate::quality::QualityCounters;
use crate::validate::sanitize_pred;

/// Complete analytics for a set of hourly breakdown rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateAnalytics {
    /// Per-hour totals, chronological, breakdowns summed
    pub hourly_totals: Vec<f64>,
    pub flow: FlowBalance,
    pub capacity: CapacityMetrics,
    pub risk: RiskAssessment,
    pub total_volume: f64,
    pub peak_hour: f64,
    /// Timestamp of computation
    pub computed_at: DateTime<Utc>,
}

impl GateAnalytics {
    /// Compute analytics from `(date, hour)` rows (sync function)
    ///
    /// Rows sharing a `(date, hour)` key are summed before utilization is
    /// measured, so IN/OUT or per-designation breakdowns can be passed as is.
    pub fn compute(points: &[TimePoint], capacity_per_hour: f64) -> Self {
        Self::from_flow(points, capacity_per_hour, calculate_flow_balance(points))
    }

    /// [`GateAnalytics::compute`], recording rows without a usable move type
    pub fn compute_with(
        points: &[TimePoint],
        capacity_per_hour: f64,
        counters: &QualityCounters,
    ) -> Self {
        let flow = calculate_flow_balance_with(points, counters);
        Self::from_flow(points, capacity_per_hour, flow)
    }

    fn from_flow(points: &[TimePoint], capacity_per_hour: f64, flow: FlowBalance) -> Self {
        let hourly_totals = hourly_totals(points);
        let capacity = calculate_capacity_metrics(&hourly_totals, capacity_per_hour);

        Self {
            flow,
            risk: calculate_risk_level(capacity.overload_hours, capacity.max_utilization),
            capacity,
            total_volume: calculate_total_volume(&hourly_totals),
            peak_hour: calculate_peak_hour(&hourly_totals),
            hourly_totals,
            computed_at: Utc::now(),
        }
    }
}

/// Sum rows per `(date, hour)`, chronological
fn hourly_totals(points: &[TimePoint]) -> Vec<f64> {
    let mut by_hour: BTreeMap<(&str, u8), f64> = BTreeMap::new();
    for point in points {
        *by_hour.entry((point.date.as_str(), point.hour)).or_insert(0.0) +=
            sanitize_pred(point.pred);
    }
    by_hour.into_values().collect()
}
