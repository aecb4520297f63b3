//! Headline figures and narrative summaries for a forecast window

use gatecast_types::{
    ForecastPoint, MoveType, MoveTypeShare, Next8hResponse, Predicted, RankingEntry,
};
use serde::Serialize;

use super::capacity::{
    calculate_capacity_metrics, calculate_total_volume, overload_count, peak_point,
    CapacityMetrics,
};
use super::flow::dominant_move_type;
use super::risk::{calculate_risk_level, RiskAssessment};
use crate::format::{format_number, round_half_up};
use crate::timeseries::parse_timestamp;
use crate::validate::sanitize_pred;

/// Busiest hour of a window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHour {
    pub ts: String,
    pub pred: f64,
}

impl PeakHour {
    /// "HH:MM" in the timestamp's own offset, `None` if `ts` is unparseable
    pub fn clock_label(&self) -> Option<String> {
        clock_label(&self.ts)
    }
}

/// Everything the KPI strip and insights box display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    /// Window total, rounded to a whole number
    pub total_volume: f64,
    pub peak: Option<PeakHour>,
    /// Hours with `pred > capacity`
    pub overload_hours: usize,
    /// Timestamps of the overloaded hours
    pub overload_ts: Vec<String>,
    pub capacity: f64,
    pub metrics: CapacityMetrics,
    pub dominant_move_type: Option<MoveType>,
    pub busiest_terminal: Option<String>,
    pub risk: RiskAssessment,
}

fn clock_label(ts: &str) -> Option<String> {
    parse_timestamp(ts)
        .ok()
        .map(|dt| dt.format("%H:%M").to_string())
}

/// Summarize a forecast response with optional share and ranking data.
///
/// Capacity comes from the response; a missing capacity is 0, which flags
/// every non-empty hour as overloaded.
pub fn summarize_forecast(
    forecast: &Next8hResponse,
    share: Option<&MoveTypeShare>,
    ranking: Option<&[RankingEntry]>,
) -> ForecastSummary {
    let points = forecast.horizon_hours.as_slice();
    let capacity = sanitize_pred(forecast.capacity_per_hour);

    let metrics = calculate_capacity_metrics(points, capacity);
    let overload_ts: Vec<String> = points
        .iter()
        .filter(|p| sanitize_pred(p.pred) > capacity)
        .map(|p| p.ts.clone())
        .collect();
    let overload_hours = overload_ts.len();

    ForecastSummary {
        total_volume: round_half_up(calculate_total_volume(points)),
        peak: peak_point(points).map(|p| PeakHour {
            ts: p.ts.clone(),
            pred: sanitize_pred(p.pred),
        }),
        overload_hours,
        overload_ts,
        capacity,
        metrics,
        dominant_move_type: share.and_then(dominant_move_type),
        busiest_terminal: ranking
            .and_then(|r| r.first())
            .map(|entry| entry.terminal.clone()),
        risk: calculate_risk_level(overload_hours, metrics.max_utilization),
    }
}

/// One-sentence summary for the executive panel
pub fn executive_summary(points: &[ForecastPoint], capacity: f64) -> String {
    let overload_hours = overload_count(points, capacity);

    match overload_hours {
        0 => "All systems operating within capacity. No immediate alerts detected in the next 8 hours."
            .to_string(),
        1 | 2 => {
            let (peak_time, peak_pred) = match peak_point(points) {
                Some(p) => (
                    clock_label(&p.ts).unwrap_or_else(|| p.ts.clone()),
                    sanitize_pred(p.pred),
                ),
                None => (String::new(), 0.0),
            };
            format!(
                "Forecast indicates {overload_hours} alert{} in next 8h. Peak expected at {peak_time} with {} containers.",
                if overload_hours > 1 { "s" } else { "" },
                format_number(round_half_up(peak_pred), 0)
            )
        }
        n => format!(
            "High risk: {n} hours exceeding capacity. Immediate resource reallocation recommended for optimal terminal performance."
        ),
    }
}

/// True for an empty series or one where every hour forecasts zero
pub fn all_zero<P: Predicted>(points: &[P]) -> bool {
    points.iter().all(|p| sanitize_pred(p.pred()) == 0.0)
}

/// Labelled lines for the insights box
pub fn insight_lines(summary: &ForecastSummary) -> Vec<String> {
    let peak = match &summary.peak {
        Some(p) => match p.clock_label() {
            Some(clock) => format!("{clock} • {}", format_number(round_half_up(p.pred), 0)),
            None => format_number(round_half_up(p.pred), 0),
        },
        None => "0".to_string(),
    };

    vec![
        format!("Total tokens (window): {}", format_number(summary.total_volume, 0)),
        format!("Peak hour: {peak}"),
        format!("Overload hours: {}", summary.overload_hours),
        format!(
            "Dominant MoveType: {}",
            summary
                .dominant_move_type
                .map(|m| m.as_str())
                .unwrap_or("-")
        ),
        format!(
            "Busiest terminal: {}",
            summary.busiest_terminal.as_deref().unwrap_or("-")
        ),
        format!("Risk: {}", summary.risk.level.headline()),
    ]
}
