//! Data models for gatecast

pub mod points;
pub mod responses;

pub use points::{Desig, ForecastPoint, MoveType, Predicted, TimePoint};
pub use responses::{
    CompositionDim, CompositionResponse, CompositionRow, DesigHourlyResponse, EnumsResponse,
    HeatmapCell, HeatmapResponse, MoveTypeHourlyResponse, MoveTypeShare, Next8hResponse,
    RankingEntry, RankingResponse, ShareResponse, SunNode, SunburstResponse,
};
