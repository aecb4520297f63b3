//! Performance benchmarks for the normalization layer
//!
//! Dashboard payloads are small (8 to 168 hourly rows per series), so these
//! mostly guard against accidental quadratic behaviour.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gatecast_core::analytics::{calculate_capacity_metrics, calculate_flow_balance, GateAnalytics};
use gatecast_core::timeseries::zero_fill_hours;
use gatecast_core::validate::validate_api_data;
use gatecast_types::TimePoint;
use serde_json::{json, Value};

/// Generate IN/OUT rows for `hours` consecutive hours starting 2024-01-01T00
fn generate_points(hours: usize) -> Vec<TimePoint> {
    (0..hours)
        .flat_map(|i| {
            let date = format!("2024-01-{:02}", 1 + i / 24);
            let hour = (i % 24) as u8;
            [
                TimePoint::new(date.clone(), hour, (i % 90) as f64).with_move_type("IN"),
                TimePoint::new(date, hour, (i % 70) as f64).with_move_type("OUT"),
            ]
        })
        .collect()
}

/// Raw payload with a sprinkling of bad preds
fn generate_payload(rows: usize) -> Value {
    let items: Vec<Value> = (0..rows)
        .map(|i| match i % 10 {
            0 => json!({"hour": i % 24, "pred": -1}),
            1 => json!({"hour": i % 24, "pred": "n/a"}),
            2 => json!({"hour": i % 24}),
            _ => json!({"hour": i % 24, "pred": i as f64 * 0.5}),
        })
        .collect();
    Value::Array(items)
}

fn validate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_api_data");

    for rows in [8, 168, 2000] {
        let payload = generate_payload(rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &payload, |b, payload| {
            b.iter(|| {
                black_box(validate_api_data(payload));
            });
        });
    }

    group.finish();
}

fn zero_fill_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("zero_fill_hours");

    for hours in [8, 24, 168] {
        let points = generate_points(hours);
        group.bench_with_input(BenchmarkId::new("hours", hours), &points, |b, points| {
            b.iter(|| {
                black_box(zero_fill_hours("2024-01-01T00:00", hours, points).ok());
            });
        });
    }

    group.finish();
}

fn metrics_benchmark(c: &mut Criterion) {
    let points = generate_points(168);
    let preds: Vec<f64> = points.iter().map(|p| p.pred).collect();

    c.bench_function("calculate_flow_balance_168h", |b| {
        b.iter(|| black_box(calculate_flow_balance(&points)));
    });
    c.bench_function("calculate_capacity_metrics_336", |b| {
        b.iter(|| black_box(calculate_capacity_metrics(&preds, 60.0)));
    });
    c.bench_function("gate_analytics_compute_168h", |b| {
        b.iter(|| black_box(GateAnalytics::compute(&points, 60.0)));
    });
}

criterion_group!(benches, validate_benchmark, zero_fill_benchmark, metrics_benchmark);
criterion_main!(benches);
