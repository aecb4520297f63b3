//! Saved-response loading and terminal formatting
//!
//! Files go through the same validation path as live responses, so a
//! malformed capture renders with its defaults reported instead of failing.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use gatecast_core::analytics::{
    executive_summary, insight_lines, ForecastSummary, GateAnalytics, HourlyFlow, RiskColor,
};
use gatecast_core::event::ForecastSnapshot;
use gatecast_core::format::{
    create_volume_tooltip, format_number, format_percentage, time_window_description,
};
use gatecast_core::quality::{ClampReason, DataQualityReport};
use gatecast_core::timeseries::ZeroFilledHour;
use gatecast_core::validate::{parse_forecast_points, parse_time_points, sanitize_reported};
use gatecast_types::{Next8hResponse, TimePoint};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Input
// ============================================================================

pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

/// The body itself when it is a bare array, else `body[key]`
fn points_of<'a>(body: &'a Value, key: &str) -> &'a Value {
    if body.is_array() {
        body
    } else {
        body.get(key).unwrap_or(&Value::Null)
    }
}

/// Forecast response from a saved `/forecast/next8h` or `/forecast/range` body
pub fn load_forecast(body: &Value, default_capacity: f64) -> (Next8hResponse, DataQualityReport) {
    let (horizon_hours, mut report) = parse_forecast_points(points_of(body, "horizon_hours"));

    let capacity_per_hour = match body.get("capacity_per_hour") {
        None | Some(Value::Null) => default_capacity,
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|capacity| sanitize_reported(capacity, &mut report, None))
            .unwrap_or(default_capacity),
        Some(other) => {
            report.record(
                ClampReason::NonNumericPred,
                None,
                format!("capacity_per_hour {other}"),
            );
            default_capacity
        }
    };
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let response = Next8hResponse {
        horizon_hours,
        generated_at: text("generated_at"),
        updated_at: text("updated_at"),
        capacity_per_hour,
    };
    (response, report)
}

/// Hourly rows from a saved `/analytics/*_hourly` body or a bare array
pub fn load_time_points(body: &Value) -> (Vec<TimePoint>, DataQualityReport) {
    parse_time_points(points_of(body, "points"))
}

// ============================================================================
// Formatters
// ============================================================================

pub fn risk_color(color: RiskColor) -> Color {
    match color {
        RiskColor::Red => Color::Red,
        RiskColor::Orange => Color::Yellow,
        RiskColor::Green => Color::Green,
    }
}

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn band(lower: Option<f64>, upper: Option<f64>) -> String {
    match (lower, upper) {
        (Some(lo), Some(hi)) => format!("{}-{}", format_number(lo, 0), format_number(hi, 0)),
        _ => "-".to_string(),
    }
}

/// Hourly table, utilization figures, risk and insights for one window
pub fn format_summary(
    response: &Next8hResponse,
    summary: &ForecastSummary,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(summary);
    }
    if response.horizon_hours.is_empty() {
        return "No forecast points.".to_string();
    }

    let capacity = summary.capacity;
    let mut table = new_table(&["Hour", "Pred", "Band", "Utilization", ""], no_color);
    for point in &response.horizon_hours {
        let overloaded = summary.overload_ts.contains(&point.ts);
        let status = if overloaded { "OVER" } else { "" };
        let status = if no_color || !overloaded {
            Cell::new(status)
        } else {
            Cell::new(status).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&point.ts),
            Cell::new(format_number(point.pred, 1)),
            Cell::new(band(point.lower, point.upper)),
            Cell::new(format_percentage(point.pred, capacity)),
            status,
        ]);
    }

    let risk = &summary.risk;
    let risk_cell = if no_color {
        Cell::new(risk.level.label())
    } else {
        Cell::new(risk.level.label()).fg(risk_color(risk.color))
    };
    let mut risk_table = Table::new();
    risk_table.add_row(vec![risk_cell, Cell::new(risk.desc)]);

    let mut lines = vec![
        table.to_string(),
        format!(
            "Capacity {}/h | max utilization {} | avg utilization {}",
            format_number(capacity, 0),
            format_number(summary.metrics.max_utilization, 2),
            format_number(summary.metrics.avg_utilization, 2)
        ),
        risk_table.to_string(),
        executive_summary(&response.horizon_hours, capacity),
        String::new(),
    ];
    lines.extend(insight_lines(summary));
    lines.join("\n")
}

/// Header line for a live snapshot
pub fn format_snapshot_header(snapshot: &ForecastSnapshot) -> String {
    let query = &snapshot.query;
    let span = snapshot
        .window
        .hours()
        .map(time_window_description)
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{} | {} | {} | {} {} -> {} ({span}) | fetched {}",
        query.terminal,
        query.move_type,
        query.desig,
        query.mode.label(),
        snapshot.window.start,
        snapshot.window.end,
        snapshot.fetched_at.format("%H:%M:%S")
    )
}

pub fn format_zero_fill(hours: &[ZeroFilledHour], json: bool, no_color: bool) -> String {
    if json {
        return to_json(&hours);
    }
    if hours.is_empty() {
        return "No hours requested.".to_string();
    }

    let mut table = new_table(&["Timestamp", "Hour", "Pred"], no_color);
    for hour in hours {
        table.add_row(vec![
            hour.ts.clone(),
            format!("{:02}", hour.hour),
            format_number(hour.pred, 1),
        ]);
    }
    table.to_string()
}

/// Flow balance, capacity and the per-hour IN/OUT split
pub fn format_flow(
    analytics: &GateAnalytics,
    hourly: &[HourlyFlow],
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(analytics);
    }

    let flow = &analytics.flow;
    let mut lines = vec![
        format!(
            "IN {}% | OUT {}% of {}",
            flow.in_percent,
            flow.out_percent,
            format_number(flow.total_flow, 0)
        ),
        create_volume_tooltip(flow.in_flow, flow.out_flow, flow.in_flow - flow.out_flow),
        format!(
            "Peak hour {} | overload hours {} | {}",
            format_number(analytics.peak_hour, 0),
            analytics.capacity.overload_hours,
            analytics.risk.level.headline()
        ),
    ];

    if !hourly.is_empty() {
        let mut table = new_table(&["Hour", "IN", "OUT", "Total"], no_color);
        for row in hourly {
            table.add_row(vec![
                format!("{:02}:00", row.hour),
                format!("{}%", row.in_percent),
                format!("{}%", row.out_percent),
                format_number(row.total, 0),
            ]);
        }
        lines.push(table.to_string());
    }
    lines.join("\n")
}

/// Defaults applied while loading one payload, `None` when it was clean
pub fn format_quality(report: &DataQualityReport) -> Option<String> {
    if report.is_clean() {
        return None;
    }

    let mut by_reason: BTreeMap<ClampReason, u64> = BTreeMap::new();
    for event in &report.events {
        *by_reason.entry(event.reason).or_insert(0) += 1;
    }
    let (warnings, errors) = report.severity_count();
    let mut out = format!(
        "Data quality: {} value(s) defaulted ({warnings} warnings, {errors} errors)",
        report.events.len()
    );
    out.push_str(&format_counts(&by_reason.into_iter().collect::<Vec<_>>()));
    Some(out)
}

/// One indented `reason: count` line per entry
pub fn format_counts(counts: &[(ClampReason, u64)]) -> String {
    counts
        .iter()
        .map(|(reason, count)| format!("\n  {reason}: {count}"))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
