//! gatecast-types - Shared data types for gatecast
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types that mirror
//! the forecasting backend's JSON bodies.
//!
//! Used by:
//! - gatecast-core (normalization layer, client)
//! - gatecast (CLI)

pub mod models;

pub use models::{
    CompositionDim, CompositionResponse, CompositionRow, Desig, DesigHourlyResponse,
    EnumsResponse, ForecastPoint, HeatmapCell, HeatmapResponse, MoveType, MoveTypeHourlyResponse,
    MoveTypeShare, Next8hResponse, Predicted, RankingEntry, RankingResponse, ShareResponse,
    SunNode, SunburstResponse, TimePoint,
};
