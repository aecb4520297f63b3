//! Three-tier overload risk classification

use serde::Serialize;
use std::fmt;

/// Utilization at or above which the window is high risk
pub const HIGH_RISK_UTILIZATION: f64 = 1.2;
/// Overloaded hours at or above which the window is high risk
pub const HIGH_RISK_OVERLOAD_HOURS: usize = 3;
/// Utilization at or above which the window needs watching
pub const WARNING_UTILIZATION: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Warning")]
    Warning,
    #[serde(rename = "Safe")]
    Safe,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Warning => "Warning",
            RiskLevel::Safe => "Safe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::High => "Immediate action needed",
            RiskLevel::Warning => "Monitor closely",
            RiskLevel::Safe => "All systems normal",
        }
    }

    pub fn color(&self) -> RiskColor {
        match self {
            RiskLevel::High => RiskColor::Red,
            RiskLevel::Warning => RiskColor::Orange,
            RiskLevel::Safe => RiskColor::Green,
        }
    }

    /// Short phrase used in the insights box
    pub fn headline(&self) -> &'static str {
        match self {
            RiskLevel::High => "High overload risk",
            RiskLevel::Warning => "Overload in some hours",
            RiskLevel::Safe => "Within capacity",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Red,
    Orange,
    Green,
}

impl RiskColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskColor::Red => "red",
            RiskColor::Orange => "orange",
            RiskColor::Green => "green",
        }
    }
}

/// Risk level with its display strings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub desc: &'static str,
    pub color: RiskColor,
}

impl From<RiskLevel> for RiskAssessment {
    fn from(level: RiskLevel) -> Self {
        Self {
            level,
            desc: level.description(),
            color: level.color(),
        }
    }
}

/// Classify a window.
///
/// - High: `overload_hours >= 3` or `max_utilization >= 1.2`
/// - Warning: `overload_hours >= 1` or `max_utilization >= 1.0`
/// - Safe: otherwise
///
/// A NaN utilization compares false everywhere, so only the hour count decides.
pub fn calculate_risk_level(overload_hours: usize, max_utilization: f64) -> RiskAssessment {
    let level = if overload_hours >= HIGH_RISK_OVERLOAD_HOURS
        || max_utilization >= HIGH_RISK_UTILIZATION
    {
        RiskLevel::High
    } else if overload_hours >= 1 || max_utilization >= WARNING_UTILIZATION {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };
    level.into()
}
