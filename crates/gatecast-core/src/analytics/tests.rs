//! Unit tests for analytics module

use super::*;
use crate::quality::{ClampReason, QualityCounters};
use gatecast_types::{ForecastPoint, MoveType, MoveTypeShare, Next8hResponse, RankingEntry};

/// Generate an 8-hour horizon with the given preds, one hour apart
fn horizon(preds: &[f64]) -> Vec<ForecastPoint> {
    preds
        .iter()
        .enumerate()
        .map(|(i, pred)| ForecastPoint::new(format!("2024-05-01T{:02}:00:00+04:00", 8 + i), *pred))
        .collect()
}

fn response(preds: &[f64], capacity: f64) -> Next8hResponse {
    Next8hResponse {
        horizon_hours: horizon(preds),
        generated_at: "2024-05-01T07:55:00+04:00".to_string(),
        updated_at: "2024-05-01T07:55:00+04:00".to_string(),
        capacity_per_hour: capacity,
    }
}

fn breakdown(hour: u8, inbound: f64, outbound: f64) -> Vec<TimePoint> {
    vec![
        TimePoint::new("2024-05-01", hour, inbound).with_move_type("IN"),
        TimePoint::new("2024-05-01", hour, outbound).with_move_type("OUT"),
    ]
}

// ============================================================================
// Capacity Tests
// ============================================================================

#[test]
fn test_capacity_two_overloads_of_three() {
    let metrics = calculate_capacity_metrics(&[120.0, 80.0, 150.0], 100.0);
    assert_eq!(metrics.overload_hours, 2);
    assert_eq!(metrics.max_utilization, 1.5);
    assert_eq!(metrics.avg_utilization, 1.17);
}

#[test]
fn test_capacity_empty_and_zero_capacity() {
    assert_eq!(
        calculate_capacity_metrics::<f64>(&[], 100.0),
        CapacityMetrics::default()
    );
    assert_eq!(
        calculate_capacity_metrics(&[50.0], 0.0),
        CapacityMetrics::default()
    );
}

#[test]
fn test_capacity_max_not_below_avg() {
    let series = [0.0, 3.3, 17.9, 61.0, 59.99, 12.5, 8.0, 100.1];
    for capacity in [1.0, 7.0, 60.0, 250.0] {
        let metrics = calculate_capacity_metrics(&series, capacity);
        assert!(metrics.max_utilization >= metrics.avg_utilization);
        assert!(metrics.overload_hours <= series.len());
    }
}

#[test]
fn test_capacity_over_forecast_points() {
    let points = horizon(&[30.0, 61.0, 45.0]);
    let metrics = calculate_capacity_metrics(&points, 60.0);
    assert_eq!(metrics.overload_hours, 1);
    assert_eq!(metrics.max_utilization, 1.02);
}

// ============================================================================
// Risk Tests
// ============================================================================

#[test]
fn test_risk_hours_threshold_ignores_utilization() {
    assert_eq!(calculate_risk_level(3, 0.5).level, RiskLevel::High);
}

#[test]
fn test_risk_utilization_threshold_ignores_hours() {
    assert_eq!(calculate_risk_level(0, 1.2).level, RiskLevel::High);
}

#[test]
fn test_risk_warning_at_exact_capacity() {
    assert_eq!(calculate_risk_level(0, 1.0).level, RiskLevel::Warning);
    assert_eq!(calculate_risk_level(1, 0.0).level, RiskLevel::Warning);

    let metrics = calculate_capacity_metrics(&[30.0, 60.0, 45.0], 60.0);
    assert_eq!(metrics.overload_hours, 0);
    assert_eq!(metrics.max_utilization, 1.0);
    let risk = calculate_risk_level(metrics.overload_hours, metrics.max_utilization);
    assert_eq!(risk.level, RiskLevel::Warning);
}

#[test]
fn test_risk_from_metrics() {
    let metrics = calculate_capacity_metrics(&[50.0, 70.0, 40.0], 60.0);
    let risk = calculate_risk_level(metrics.overload_hours, metrics.max_utilization);
    assert_eq!(risk.level, RiskLevel::Warning);
    assert_eq!(risk.color, RiskColor::Orange);
}

// ============================================================================
// Flow Tests
// ============================================================================

#[test]
fn test_flow_over_forecast_points() {
    let mut points = horizon(&[60.0, 40.0]);
    points[0].move_type = Some("IN".to_string());
    points[1].move_type = Some("OUT".to_string());

    let balance = calculate_flow_balance(&points);
    assert_eq!(balance.in_percent, 60);
    assert_eq!(balance.out_percent, 40);
}

#[test]
fn test_flow_percentages_bounded() {
    let data: Vec<TimePoint> = (0..24u8)
        .flat_map(|h| breakdown(h, h as f64 * 1.7, (24 - h) as f64 * 0.3))
        .collect();
    let balance = calculate_flow_balance(&data);
    assert!(balance.in_percent <= 100);
    assert!(balance.out_percent <= 100);
    assert!((99..=101).contains(&(balance.in_percent + balance.out_percent)));
}

// ============================================================================
// Insights Tests
// ============================================================================

#[test]
fn test_summary_of_calm_window() {
    let resp = response(&[10.0, 20.0, 15.0, 5.0, 0.0, 0.0, 30.0, 12.0], 60.0);
    let summary = summarize_forecast(&resp, None, None);

    assert_eq!(summary.total_volume, 92.0);
    assert_eq!(summary.overload_hours, 0);
    assert_eq!(summary.risk.level, RiskLevel::Safe);
    assert_eq!(summary.peak.as_ref().map(|p| p.pred), Some(30.0));
    assert_eq!(summary.dominant_move_type, None);
    assert_eq!(summary.busiest_terminal, None);
}

#[test]
fn test_summary_with_share_and_ranking() {
    let resp = response(&[70.0, 80.0, 90.0, 10.0], 60.0);
    let share = MoveTypeShare {
        inbound: 100.0,
        outbound: 140.0,
    };
    let ranking = vec![
        RankingEntry {
            terminal: "T2".to_string(),
            total_pred: 900.0,
        },
        RankingEntry {
            terminal: "T1".to_string(),
            total_pred: 400.0,
        },
    ];
    let summary = summarize_forecast(&resp, Some(&share), Some(&ranking));

    assert_eq!(summary.overload_hours, 3);
    assert_eq!(summary.overload_ts.len(), 3);
    assert_eq!(summary.risk.level, RiskLevel::High);
    assert_eq!(summary.dominant_move_type, Some(MoveType::Out));
    assert_eq!(summary.busiest_terminal.as_deref(), Some("T2"));
    assert_eq!(
        summary.peak.as_ref().and_then(|p| p.clock_label()).as_deref(),
        Some("10:00")
    );
}

#[test]
fn test_insight_lines() {
    let resp = response(&[70.0, 10.0], 60.0);
    let lines = insight_lines(&summarize_forecast(&resp, None, None));

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Total tokens (window): 80");
    assert_eq!(lines[1], "Peak hour: 08:00 • 70");
    assert_eq!(lines[2], "Overload hours: 1");
    assert_eq!(lines[3], "Dominant MoveType: -");
    assert_eq!(lines[5], "Risk: Overload in some hours");
}

#[test]
fn test_executive_summary_tiers() {
    let calm = executive_summary(&horizon(&[10.0, 20.0]), 60.0);
    assert!(calm.starts_with("All systems operating within capacity"));

    let alerts = executive_summary(&horizon(&[10.0, 65.4, 20.0]), 60.0);
    assert_eq!(
        alerts,
        "Forecast indicates 1 alert in next 8h. Peak expected at 09:00 with 65 containers."
    );

    let two = executive_summary(&horizon(&[61.0, 62.0]), 60.0);
    assert!(two.starts_with("Forecast indicates 2 alerts"));

    let high = executive_summary(&horizon(&[61.0, 62.0, 63.0]), 60.0);
    assert!(high.starts_with("High risk: 3 hours exceeding capacity."));
}

#[test]
fn test_all_zero() {
    assert!(all_zero::<f64>(&[]));
    assert!(all_zero(&horizon(&[0.0, 0.0])));
    assert!(!all_zero(&horizon(&[0.0, 0.1])));
}

// ============================================================================
// GateAnalytics Tests
// ============================================================================

#[test]
fn test_gate_analytics_sums_breakdowns_per_hour() {
    let mut data = breakdown(8, 40.0, 30.0);
    data.extend(breakdown(9, 10.0, 5.0));
    data.extend(breakdown(10, 20.0, 20.0));

    let analytics = GateAnalytics::compute(&data, 60.0);

    assert_eq!(analytics.hourly_totals, vec![70.0, 15.0, 40.0]);
    assert_eq!(analytics.capacity.overload_hours, 1);
    assert_eq!(analytics.capacity.max_utilization, 1.17);
    assert_eq!(analytics.total_volume, 125.0);
    assert_eq!(analytics.peak_hour, 70.0);
    assert_eq!(analytics.flow.in_percent, 56);
    assert_eq!(analytics.flow.out_percent, 44);
    assert_eq!(analytics.risk.level, RiskLevel::Warning);
}

#[test]
fn test_gate_analytics_peak_at_capacity_is_warning() {
    let mut data = breakdown(8, 35.0, 25.0);
    data.extend(breakdown(9, 10.0, 10.0));

    let analytics = GateAnalytics::compute(&data, 60.0);
    assert_eq!(analytics.capacity.overload_hours, 0);
    assert_eq!(analytics.capacity.max_utilization, 1.0);
    assert_eq!(analytics.risk.level, RiskLevel::Warning);
}

#[test]
fn test_gate_analytics_counts_unknown_move_types() {
    let counters = QualityCounters::new();
    let mut data = breakdown(8, 40.0, 20.0);
    data.push(TimePoint::new("2024-05-01", 8, 5.0).with_move_type("TRANSFER"));
    data.push(TimePoint::new("2024-05-01", 9, 5.0));

    let analytics = GateAnalytics::compute_with(&data, 100.0, &counters);
    assert_eq!(analytics.flow.total_flow, 60.0);
    assert_eq!(analytics.total_volume, 70.0);
    assert_eq!(counters.get(ClampReason::UnknownMoveType), 2);
}

#[test]
fn test_gate_analytics_empty() {
    let analytics = GateAnalytics::compute(&[], 60.0);
    assert!(analytics.hourly_totals.is_empty());
    assert_eq!(analytics.capacity, CapacityMetrics::default());
    assert_eq!(analytics.risk.level, RiskLevel::Safe);
}
