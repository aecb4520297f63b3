//! Inbound/outbound flow balance
//!
//! Shares are whole percentages computed independently per direction, so a
//! pair may sum to 99 or 101. That is a rounding artifact, not a bug.

use gatecast_types::{ForecastPoint, MoveType, MoveTypeShare, Predicted, TimePoint};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::format::round_half_up;
use crate::quality::{ClampReason, QualityCounters, QUALITY_TARGET};
use crate::validate::sanitize_pred;

/// A point that may carry a move type
pub trait FlowSample: Predicted {
    /// Raw move type string as sent by the API
    fn raw_move_type(&self) -> Option<&str>;
}

impl FlowSample for TimePoint {
    fn raw_move_type(&self) -> Option<&str> {
        self.move_type.as_deref()
    }
}

impl FlowSample for ForecastPoint {
    fn raw_move_type(&self) -> Option<&str> {
        self.move_type.as_deref()
    }
}

impl<T: FlowSample> FlowSample for &T {
    fn raw_move_type(&self) -> Option<&str> {
        (**self).raw_move_type()
    }
}

/// IN/OUT split of a set of points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowBalance {
    pub in_percent: u32,
    pub out_percent: u32,
    pub total_flow: f64,
    pub in_flow: f64,
    pub out_flow: f64,
}

/// Per-hour IN/OUT split for the gate load panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyFlow {
    pub hour: u8,
    pub in_percent: u32,
    pub out_percent: u32,
    pub total: f64,
}

/// Integer share of `part` in `total`, 0 when there is no total
fn share_of(part: f64, total: f64) -> u32 {
    if total > 0.0 {
        round_half_up(part / total * 100.0).clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

/// Sum `pred` per direction; unknown or missing move types are ignored
fn split_totals<P: FlowSample>(data: &[P]) -> (f64, f64, usize) {
    let mut in_flow = 0.0;
    let mut out_flow = 0.0;
    let mut ignored = 0usize;

    for point in data {
        match point.raw_move_type().and_then(MoveType::parse) {
            Some(MoveType::In) => in_flow += sanitize_pred(point.pred()),
            Some(MoveType::Out) => out_flow += sanitize_pred(point.pred()),
            None => ignored += 1,
        }
    }

    (in_flow, out_flow, ignored)
}

/// Balance plus the number of points without a usable move type
fn flow_balance<P: FlowSample>(data: &[P]) -> (FlowBalance, usize) {
    let (in_flow, out_flow, ignored) = split_totals(data);
    if ignored > 0 {
        tracing::debug!(
            target: QUALITY_TARGET,
            reason = ClampReason::UnknownMoveType.as_str(),
            count = ignored,
            "Ignored points without IN/OUT move type"
        );
    }

    let total_flow = in_flow + out_flow;
    let balance = FlowBalance {
        in_percent: share_of(in_flow, total_flow),
        out_percent: share_of(out_flow, total_flow),
        total_flow,
        in_flow,
        out_flow,
    };
    (balance, ignored)
}

/// Compute the flow balance of points distinguished by move type.
///
/// Matching is case-insensitive. A zero total short-circuits to 0/0.
pub fn calculate_flow_balance<P: FlowSample>(data: &[P]) -> FlowBalance {
    flow_balance(data).0
}

/// [`calculate_flow_balance`], counting each ignored point as
/// [`ClampReason::UnknownMoveType`]
pub fn calculate_flow_balance_with<P: FlowSample>(
    data: &[P],
    counters: &QualityCounters,
) -> FlowBalance {
    let (balance, ignored) = flow_balance(data);
    counters.add(ClampReason::UnknownMoveType, ignored as u64);
    balance
}

/// Flow balance per hour of day, hours ascending
pub fn hourly_flow_split(data: &[TimePoint]) -> Vec<HourlyFlow> {
    let mut by_hour: BTreeMap<u8, Vec<&TimePoint>> = BTreeMap::new();
    for point in data {
        by_hour.entry(point.hour).or_default().push(point);
    }

    by_hour
        .into_iter()
        .map(|(hour, points)| {
            let balance = calculate_flow_balance(&points);
            HourlyFlow {
                hour,
                in_percent: balance.in_percent,
                out_percent: balance.out_percent,
                total: balance.total_flow,
            }
        })
        .collect()
}

/// Direction carrying more volume; IN wins ties, `None` when both are empty
pub fn dominant_move_type(share: &MoveTypeShare) -> Option<MoveType> {
    let inbound = sanitize_pred(share.inbound);
    let outbound = sanitize_pred(share.outbound);
    if inbound == 0.0 && outbound == 0.0 {
        None
    } else if inbound >= outbound {
        Some(MoveType::In)
    } else {
        Some(MoveType::Out)
    }
}
