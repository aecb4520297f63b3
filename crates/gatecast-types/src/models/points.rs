//! Hourly forecast points as returned by the forecasting backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything carrying a forecast quantity.
///
/// Metric calculators are generic over this so they accept typed points,
/// zero-filled buckets and bare numbers alike.
pub trait Predicted {
    fn pred(&self) -> f64;
}

impl Predicted for f64 {
    fn pred(&self) -> f64 {
        *self
    }
}

impl<T: Predicted + ?Sized> Predicted for &T {
    fn pred(&self) -> f64 {
        (**self).pred()
    }
}

/// Direction of container flow through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveType {
    In,
    Out,
}

impl MoveType {
    pub const ALL: [MoveType; 2] = [MoveType::In, MoveType::Out];

    /// Case-insensitive parse; anything other than "in"/"out" is `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "in" => Some(MoveType::In),
            "out" => Some(MoveType::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveType::In => "IN",
            MoveType::Out => "OUT",
        }
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container designation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Desig {
    Empty,
    Full,
    /// Export
    Exp,
    /// Unknown or blank in the source table
    Unk,
}

impl Desig {
    /// Display order used for stacked charts
    pub const ALL: [Desig; 4] = [Desig::Empty, Desig::Full, Desig::Exp, Desig::Unk];

    /// Blank or unrecognised designations map to `Unk` so rows are never dropped
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EMPTY" => Desig::Empty,
            "FULL" => Desig::Full,
            "EXP" => Desig::Exp,
            _ => Desig::Unk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Desig::Empty => "EMPTY",
            Desig::Full => "FULL",
            Desig::Exp => "EXP",
            Desig::Unk => "UNK",
        }
    }
}

impl fmt::Display for Desig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecasted quantity for one hour, optionally broken down by
/// move type or designation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar date, "YYYY-MM-DD"
    pub date: String,
    /// Hour of day (0-23)
    pub hour: u8,
    /// Forecast quantity (non-negative once validated)
    #[serde(default)]
    pub pred: f64,
    /// Raw move type as sent by the API ("IN"/"OUT", any case)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_type: Option<String>,
    /// Raw designation as sent by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desig: Option<String>,
}

impl TimePoint {
    pub fn new(date: impl Into<String>, hour: u8, pred: f64) -> Self {
        Self {
            date: date.into(),
            hour,
            pred,
            move_type: None,
            desig: None,
        }
    }

    pub fn with_move_type(mut self, move_type: impl Into<String>) -> Self {
        self.move_type = Some(move_type.into());
        self
    }

    pub fn with_desig(mut self, desig: impl Into<String>) -> Self {
        self.desig = Some(desig.into());
        self
    }

    /// Parsed move type, `None` when missing or unrecognised
    pub fn parsed_move_type(&self) -> Option<MoveType> {
        self.move_type.as_deref().and_then(MoveType::parse)
    }

    /// Parsed designation, `Unk` when missing or unrecognised
    pub fn parsed_desig(&self) -> Desig {
        self.desig.as_deref().map(Desig::from_raw).unwrap_or(Desig::Unk)
    }
}

impl Predicted for TimePoint {
    fn pred(&self) -> f64 {
        self.pred
    }
}

/// A single hourly forecast with optional confidence band and observed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// ISO-8601 timestamp (localized to the terminal's timezone by the API)
    pub ts: String,
    #[serde(default)]
    pub pred: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    /// Lower bound of the prediction interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// Upper bound of the prediction interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
}

impl ForecastPoint {
    pub fn new(ts: impl Into<String>, pred: f64) -> Self {
        Self {
            ts: ts.into(),
            pred,
            actual: None,
            lower: None,
            upper: None,
            move_type: None,
            desig: None,
            terminal_id: None,
        }
    }

    /// True when both interval bounds are present
    pub fn has_band(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }
}

impl Predicted for ForecastPoint {
    fn pred(&self) -> f64 {
        self.pred
    }
}
