//! Trend records from the trailing-window regression.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a fitted trend after the significance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Linear-trend fit for one (facility, role) over the trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub facility: String,
    pub role: String,
    /// First observed date inside the analysis window.
    pub window_start: NaiveDate,
    /// Last observed date inside the analysis window.
    pub window_end: NaiveDate,
    /// Hours per day from the OLS fit.
    pub slope: f64,
    /// Two-tailed p-value for slope ≠ 0.
    pub p_value: f64,
    pub r_squared: f64,
    /// p-value ≤ 0.05.
    pub is_significant: bool,
    /// Stable whenever the fit is not significant, regardless of slope sign.
    pub direction: TrendDirection,
    /// Trailing-window length that was requested, in weeks.
    pub weeks_analyzed: u32,
}
