//! Response bodies of the forecasting REST API

use serde::{Deserialize, Serialize};

use super::points::{ForecastPoint, TimePoint};

/// `/forecast/next8h` and `/forecast/range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Next8hResponse {
    pub horizon_hours: Vec<ForecastPoint>,
    pub generated_at: String,
    pub updated_at: String,
    /// Configured containers/hour threshold for the terminal
    #[serde(default)]
    pub capacity_per_hour: f64,
}

/// One terminal's window total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub terminal: String,
    #[serde(default)]
    pub total_pred: f64,
}

/// `/analytics/terminal_ranking`, sorted busiest first by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(default)]
    pub ranking: Vec<RankingEntry>,
}

/// IN/OUT totals over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTypeShare {
    #[serde(rename = "IN", default)]
    pub inbound: f64,
    #[serde(rename = "OUT", default)]
    pub outbound: f64,
}

impl MoveTypeShare {
    pub fn total(&self) -> f64 {
        self.inbound + self.outbound
    }
}

/// `/analytics/movetype_share`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareResponse {
    #[serde(default)]
    pub share: MoveTypeShare,
}

/// `/analytics/movetype_hourly`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTypeHourlyResponse {
    #[serde(default)]
    pub points: Vec<TimePoint>,
}

/// `/analytics/desig_hourly`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesigHourlyResponse {
    #[serde(default)]
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub terminal: String,
    pub hour: u8,
    #[serde(default)]
    pub pred: f64,
}

/// `/analytics/terminal_hour_heatmap`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    #[serde(default)]
    pub cells: Vec<HeatmapCell>,
}

/// Node of the terminal -> move type -> designation hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SunNode>,
}

impl SunNode {
    /// Leaf value, or the sum of the subtree when the node only has children
    pub fn total(&self) -> f64 {
        match self.value {
            Some(v) => v,
            None => self.children.iter().map(SunNode::total).sum(),
        }
    }
}

/// `/analytics/sunburst`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SunburstResponse {
    #[serde(default)]
    pub sunburst: Vec<SunNode>,
}

/// Breakdown dimension of the composition endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionDim {
    Desig,
    Movetype,
}

impl CompositionDim {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionDim::Desig => "desig",
            CompositionDim::Movetype => "movetype",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRow {
    pub terminal: String,
    pub key: String,
    #[serde(default)]
    pub pred: f64,
}

/// `/analytics/composition_by_terminal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResponse {
    pub dim: CompositionDim,
    #[serde(default)]
    pub rows: Vec<CompositionRow>,
}

/// `/meta/enums`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumsResponse {
    #[serde(default)]
    pub terminals: Vec<String>,
    #[serde(default)]
    pub move_types: Vec<String>,
    #[serde(default)]
    pub desigs: Vec<String>,
}
