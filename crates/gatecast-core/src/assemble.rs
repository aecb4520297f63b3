//! Chart-shape assemblers
//!
//! Pure reshaping of validated API rows into the series a renderer needs.
//! No styling or layout lives here, only ordering, bucketing and rounding.

use gatecast_types::{
    CompositionDim, CompositionRow, Desig, HeatmapCell, MoveType, RankingEntry, TimePoint,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::format::round_half_up;
use crate::validate::sanitize_pred;

/// One named series of an hourly category chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries<T> {
    pub name: String,
    pub data: Vec<T>,
}

/// Hours on the x axis, one series per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySeries {
    pub hours: Vec<u8>,
    pub series: Vec<NamedSeries<f64>>,
}

impl CategorySeries {
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.data.as_slice())
    }
}

/// Bucket rows by hour of day and category.
///
/// Hours ascend, categories sort lexically, missing cells are 0 and
/// duplicate `(category, hour)` rows are summed. Rows whose key is `None`
/// are skipped. Values are rounded to whole containers.
pub fn category_series_by_hour<F>(points: &[TimePoint], key: F) -> CategorySeries
where
    F: Fn(&TimePoint) -> Option<String>,
{
    let mut cells: HashMap<(String, u8), f64> = HashMap::new();
    let mut hours = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for point in points {
        let Some(category) = key(point) else {
            continue;
        };
        hours.insert(point.hour);
        *cells.entry((category.clone(), point.hour)).or_insert(0.0) += sanitize_pred(point.pred);
        categories.insert(category);
    }

    let hours: Vec<u8> = hours.into_iter().collect();
    let series = categories
        .into_iter()
        .map(|name| {
            let data = hours
                .iter()
                .map(|h| {
                    let value = cells.get(&(name.clone(), *h)).copied().unwrap_or(0.0);
                    round_half_up(value)
                })
                .collect();
            NamedSeries { name, data }
        })
        .collect();

    CategorySeries { hours, series }
}

/// IN/OUT trend by hour; rows without a move type are skipped
pub fn move_type_series(points: &[TimePoint]) -> CategorySeries {
    category_series_by_hour(points, |p| {
        p.move_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| match MoveType::parse(m) {
                Some(known) => known.as_str().to_string(),
                None => m.to_uppercase(),
            })
    })
}

/// Designation stacked area by hour; blank designations count as UNK
pub fn desig_series(points: &[TimePoint]) -> CategorySeries {
    category_series_by_hour(points, |p| Some(p.parsed_desig().as_str().to_string()))
}

/// 100%-stacked composition, one row of integer percentages per terminal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentStack {
    /// Busiest terminal first
    pub terminals: Vec<String>,
    /// One series per key, `data[i]` belongs to `terminals[i]`
    pub series: Vec<NamedSeries<u32>>,
}

/// Fixed series order for a composition dimension
pub fn composition_keys(dim: CompositionDim) -> Vec<&'static str> {
    match dim {
        CompositionDim::Desig => Desig::ALL.iter().map(Desig::as_str).collect(),
        CompositionDim::Movetype => MoveType::ALL.iter().map(MoveType::as_str).collect(),
    }
}

/// Percent-of-terminal composition.
///
/// Terminals are ordered by total descending (first seen wins ties). Keys
/// follow [`composition_keys`] with unexpected keys appended in first-seen
/// order. A terminal with zero total yields 0 for every key.
pub fn composition_percent_stack(rows: &[CompositionRow], dim: CompositionDim) -> PercentStack {
    let mut terminal_order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    let mut parts: HashMap<(&str, &str), f64> = HashMap::new();
    let mut keys: Vec<String> = composition_keys(dim).into_iter().map(String::from).collect();

    for row in rows {
        let pred = sanitize_pred(row.pred);
        let terminal = row.terminal.as_str();
        if !totals.contains_key(terminal) {
            terminal_order.push(terminal);
        }
        *totals.entry(terminal).or_insert(0.0) += pred;
        *parts.entry((terminal, row.key.as_str())).or_insert(0.0) += pred;
        if !keys.iter().any(|k| k == &row.key) {
            keys.push(row.key.clone());
        }
    }

    // stable sort keeps first-seen order among equal totals
    let total_of = |t: &str| totals.get(t).copied().unwrap_or(0.0);
    terminal_order.sort_by(|a, b| total_of(*b).total_cmp(&total_of(*a)));

    let series = keys
        .into_iter()
        .map(|key| {
            let data = terminal_order
                .iter()
                .map(|t| {
                    let total = totals.get(t).copied().filter(|v| *v > 0.0).unwrap_or(1.0);
                    let part = parts.get(&(*t, key.as_str())).copied().unwrap_or(0.0);
                    round_half_up(part / total * 100.0) as u32
                })
                .collect();
            NamedSeries { name: key, data }
        })
        .collect();

    PercentStack {
        terminals: terminal_order.into_iter().map(String::from).collect(),
        series,
    }
}

/// Terminal x hour grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    /// Sorted lexically
    pub terminals: Vec<String>,
    /// Ascending
    pub hours: Vec<u8>,
    /// `values[t][h]`, rounded, 0 where no cell was reported
    pub values: Vec<Vec<f64>>,
    /// Color scale maximum, never below 1
    pub vmax: f64,
}

impl Default for HeatmapMatrix {
    fn default() -> Self {
        Self {
            terminals: Vec::new(),
            hours: Vec::new(),
            values: Vec::new(),
            vmax: 1.0,
        }
    }
}

impl HeatmapMatrix {
    pub fn get(&self, terminal: &str, hour: u8) -> Option<f64> {
        let t = self.terminals.iter().position(|x| x == terminal)?;
        let h = self.hours.iter().position(|x| *x == hour)?;
        self.values.get(t)?.get(h).copied()
    }
}

pub fn heatmap_matrix(cells: &[HeatmapCell]) -> HeatmapMatrix {
    if cells.is_empty() {
        return HeatmapMatrix::default();
    }

    let mut grid: BTreeMap<(&str, u8), f64> = BTreeMap::new();
    for cell in cells {
        *grid.entry((cell.terminal.as_str(), cell.hour)).or_insert(0.0) += sanitize_pred(cell.pred);
    }

    let terminals: Vec<String> = cells
        .iter()
        .map(|c| c.terminal.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();
    let hours: Vec<u8> = cells
        .iter()
        .map(|c| c.hour)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let values = terminals
        .iter()
        .map(|t| {
            hours
                .iter()
                .map(|h| round_half_up(grid.get(&(t.as_str(), *h)).copied().unwrap_or(0.0)))
                .collect()
        })
        .collect();
    let vmax = grid.values().copied().fold(1.0, f64::max);

    HeatmapMatrix {
        terminals,
        hours,
        values,
        vmax,
    }
}

/// Ranking bars with a reference marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingBullets {
    /// Backend order, busiest first
    pub terminals: Vec<String>,
    /// Rounded totals
    pub values: Vec<f64>,
    /// 80% of the largest total, rounded
    pub reference: f64,
    /// 110% of the largest total, rounded
    pub axis_max: f64,
}

impl RankingBullets {
    /// Each terminal's share of the largest total, in percent
    pub fn relative_to_max(&self) -> Vec<f64> {
        let max = self.values.iter().copied().fold(0.0, f64::max);
        self.values
            .iter()
            .map(|v| if max > 0.0 { v / max * 100.0 } else { 0.0 })
            .collect()
    }
}

/// `None` when there is nothing to rank
pub fn ranking_bullets(ranking: &[RankingEntry]) -> Option<RankingBullets> {
    if ranking.is_empty() {
        return None;
    }

    let max_total = ranking
        .iter()
        .map(|r| sanitize_pred(r.total_pred))
        .fold(0.0, f64::max);

    Some(RankingBullets {
        terminals: ranking.iter().map(|r| r.terminal.clone()).collect(),
        values: ranking
            .iter()
            .map(|r| round_half_up(sanitize_pred(r.total_pred)))
            .collect(),
        reference: round_half_up(max_total * 0.8),
        axis_max: round_half_up(max_total * 1.1),
    })
}
