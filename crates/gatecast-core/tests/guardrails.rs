//! Guardrail properties of the normalization layer
//!
//! Whatever the backend sends, the dashboard must render: no panics, no
//! negative quantities, no division by zero.

use chrono::DateTime;
use gatecast_core::analytics::{
    calculate_capacity_metrics, calculate_flow_balance, calculate_risk_level, CapacityMetrics,
    FlowBalance, RiskLevel,
};
use gatecast_core::format::{format_number, format_percentage};
use gatecast_core::quality::{ClampReason, QualityCounters};
use gatecast_core::timeseries::{parse_timestamp, zero_fill_hours};
use gatecast_core::validate::{validate_api_data, validate_api_data_with};
use gatecast_core::window::{compute_window, refetch_interval, DashboardQuery, ViewMode};
use gatecast_types::{Desig, TimePoint};
use serde_json::{json, Value};

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validation_keeps_length_and_clamps_every_pred() {
    let payloads = vec![
        json!([]),
        json!([{"pred": 1.5}, {"pred": -2}, {"pred": "7"}, {"pred": null}, {}]),
        json!([1, "two", null, [3], {"pred": {"nested": true}}]),
        json!([{"pred": 1e308}, {"pred": -0.0}, {"pred": 0}]),
    ];

    for payload in payloads {
        let Value::Array(items) = &payload else {
            unreachable!()
        };
        let points = validate_api_data(&payload);
        assert_eq!(points.len(), items.len());
        for point in &points {
            assert!(point.pred.is_finite());
            assert!(point.pred >= 0.0, "pred {} must be non-negative", point.pred);
        }
    }
}

#[test]
fn test_validation_of_non_arrays_is_empty() {
    for payload in [
        json!("text"),
        json!({"horizon_hours": []}),
        json!(null),
        json!(3.5),
        json!(true),
    ] {
        assert!(validate_api_data(&payload).is_empty());
    }
}

#[test]
fn test_validation_preserves_extra_fields() {
    let payload = json!([{"ts": "2024-05-01T08:00:00+04:00", "terminal_id": "T1", "pred": -4}]);
    let points = validate_api_data(&payload);
    assert_eq!(points[0].pred, 0.0);
    assert_eq!(points[0].field("terminal_id"), Some(&json!("T1")));
    assert_eq!(points[0].field("ts"), Some(&json!("2024-05-01T08:00:00+04:00")));
}

#[test]
fn test_every_clamp_is_counted() {
    let counters = QualityCounters::new();
    validate_api_data_with(
        &json!([{"pred": -1}, {"pred": "x"}, {}, {"pred": 2}, 7]),
        &counters,
    );
    validate_api_data_with(&json!({"not": "an array"}), &counters);

    assert_eq!(counters.get(ClampReason::NegativePred), 1);
    assert_eq!(counters.get(ClampReason::NonNumericPred), 1);
    assert_eq!(counters.get(ClampReason::MissingPred), 1);
    assert_eq!(counters.get(ClampReason::NonObjectRecord), 1);
    assert_eq!(counters.get(ClampReason::NonArrayPayload), 1);
    assert_eq!(counters.total(), 5);
}

// ============================================================================
// Zero-fill
// ============================================================================

#[test]
fn test_zero_fill_of_nothing_is_all_zero() {
    for n in [0, 1, 8, 24, 200] {
        let filled = zero_fill_hours("2024-06-01T00:00", n, &[]).unwrap();
        assert_eq!(filled.len(), n);
        assert!(filled.iter().all(|h| h.pred == 0.0));
    }
}

#[test]
fn test_zero_fill_crosses_day_boundary() {
    let filled = zero_fill_hours("2024-01-31T23:00", 3, &[]).unwrap();
    let hours: Vec<u8> = filled.iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![23, 0, 1]);
    assert!(filled[1].ts.starts_with("2024-02-01T00:00"));
    assert!(filled[2].ts.starts_with("2024-02-01T01:00"));

    let times: Vec<_> = filled
        .iter()
        .map(|h| parse_timestamp(&h.ts).unwrap())
        .collect();
    for pair in times.windows(2) {
        assert_eq!((pair[1] - pair[0]).num_minutes(), 60);
    }
}

#[test]
fn test_zero_fill_places_sparse_rows() {
    let data = vec![
        TimePoint::new("2024-01-31", 23, 5.0),
        TimePoint::new("2024-02-01", 1, 2.0),
        TimePoint::new("2024-02-02", 1, 99.0),
    ];
    let filled = zero_fill_hours("2024-01-31T23:00", 3, &data).unwrap();
    let preds: Vec<f64> = filled.iter().map(|h| h.pred).collect();
    assert_eq!(preds, vec![5.0, 0.0, 2.0]);
}

// ============================================================================
// Metrics
// ============================================================================

fn directed(move_type: &str, pred: f64) -> TimePoint {
    TimePoint::new("2024-05-01", 8, pred).with_move_type(move_type)
}

#[test]
fn test_flow_balance_examples() {
    assert_eq!(calculate_flow_balance::<TimePoint>(&[]), FlowBalance::default());

    let balance = calculate_flow_balance(&[directed("IN", 60.0), directed("OUT", 40.0)]);
    assert_eq!(
        balance,
        FlowBalance {
            in_percent: 60,
            out_percent: 40,
            total_flow: 100.0,
            in_flow: 60.0,
            out_flow: 40.0,
        }
    );
}

#[test]
fn test_capacity_examples() {
    assert_eq!(
        calculate_capacity_metrics::<f64>(&[], 100.0),
        CapacityMetrics::default()
    );
    assert_eq!(
        calculate_capacity_metrics(&[50.0], 0.0),
        CapacityMetrics::default()
    );

    let metrics = calculate_capacity_metrics(&[120.0, 80.0, 150.0], 100.0);
    assert_eq!(metrics.overload_hours, 2);
    assert_eq!(metrics.max_utilization, 1.5);
}

#[test]
fn test_risk_examples() {
    assert_eq!(calculate_risk_level(3, 0.5).level, RiskLevel::High);
    assert_eq!(calculate_risk_level(0, 1.2).level, RiskLevel::High);

    let json = serde_json::to_value(calculate_risk_level(3, 0.5)).unwrap();
    assert_eq!(json["level"], "High Risk");
}

#[test]
fn test_risk_warning_boundary_is_inclusive() {
    assert_eq!(calculate_risk_level(0, 0.99).level, RiskLevel::Safe);
    assert_eq!(calculate_risk_level(0, 1.0).level, RiskLevel::Warning);
    assert_eq!(calculate_risk_level(1, 0.0).level, RiskLevel::Warning);
    assert_eq!(calculate_risk_level(2, 1.19).level, RiskLevel::Warning);

    let metrics = calculate_capacity_metrics(&[60.0], 60.0);
    assert_eq!(metrics.overload_hours, 0);
    let risk = calculate_risk_level(metrics.overload_hours, metrics.max_utilization);
    assert_eq!(risk.level, RiskLevel::Warning);
}

#[test]
fn test_risk_is_monotonic_in_hours() {
    let rank = |level: RiskLevel| match level {
        RiskLevel::Safe => 0,
        RiskLevel::Warning => 1,
        RiskLevel::High => 2,
    };
    for utilization in [0.0, 0.5, 1.0, 1.1, 1.2, 3.0] {
        let mut previous = 0;
        for hours in 0..6 {
            let current = rank(calculate_risk_level(hours, utilization).level);
            assert!(current >= previous);
            previous = current;
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

#[test]
fn test_format_examples() {
    assert_eq!(format_number(f64::NAN, 1), "0");
    assert_eq!(format_number(123.456, 1), "123.5");
    assert_eq!(format_percentage(5.0, 0.0), "0%");
}

#[test]
fn test_infinity_passes_through() {
    assert_eq!(format_number(f64::INFINITY, 1), "Infinity");
    assert_eq!(format_percentage(f64::INFINITY, 10.0), "0%");
}

// ============================================================================
// Query state
// ============================================================================

#[test]
fn test_blank_desig_is_unknown() {
    assert_eq!(Desig::from_raw("  "), Desig::Unk);
    assert_eq!(TimePoint::new("2024-05-01", 1, 1.0).parsed_desig(), Desig::Unk);
}

#[test]
fn test_incomplete_custom_range_falls_back_to_next8h() {
    let now = DateTime::parse_from_rfc3339("2024-05-01T09:15:00+04:00").unwrap();
    let query = DashboardQuery::from_params([("mode", "range"), ("start", "2024-04-01T00:00")]);
    assert_eq!(query.mode, ViewMode::Custom);

    let window = compute_window(&query, now);
    assert_eq!(window.start, "2024-05-01T09:00");
    assert_eq!(window.end, "2024-05-01T17:00");
    assert_eq!(refetch_interval(query.mode), None);
}
