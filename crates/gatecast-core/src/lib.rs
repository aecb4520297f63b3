//! gatecast-core - Core library for gatecast
//!
//! Normalization layer for gate-token forecasts: boundary validation,
//! zero-filling, flow/capacity/risk metrics and formatting, plus the API
//! client and live poller built on top of them.

pub mod analytics;
pub mod assemble;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod poller;
pub mod preferences;
pub mod quality;
pub mod timeseries;
pub mod validate;
pub mod window;

pub use analytics::{
    calculate_capacity_metrics, calculate_flow_balance, calculate_risk_level, CapacityMetrics,
    FlowBalance, ForecastSummary, GateAnalytics, RiskAssessment, RiskLevel,
};
pub use cache::ResponseCache;
pub use client::ForecastClient;
pub use config::GatecastConfig;
pub use error::{CoreError, ErrorSeverity};
pub use event::{EventBus, ForecastEvent, ForecastSnapshot};
pub use format::{format_number, format_percentage};
pub use poller::{fetch_snapshot, LivePoller, PollerConfig};
pub use preferences::{ColorScheme, Preferences};
pub use quality::{ClampReason, DataQualityReport, QualityCounters};
pub use timeseries::{zero_fill_hours, ZeroFilledHour};
pub use validate::{validate_api_data, validate_api_data_with, NormalizedPoint};
pub use window::{compute_window, DashboardQuery, TimeWindow, ViewMode};
