//! Compiled exception records — the engine's primary output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::VariancePercent;

/// Source class of a compiled exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Model,
    Statistical,
    Trend,
}

impl ExceptionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Statistical => "statistical",
            Self::Trend => "trend",
        }
    }
}

/// One reportable staffing exception.
///
/// Produced only by the exception compiler; every record traces back to
/// exactly one variance or trend record. Read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub facility: String,
    pub role: String,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
    /// Normalized 0–100 seriousness score.
    pub severity: f64,
    /// Human-readable one-liner for reports.
    pub description: String,
    /// Signed magnitude carried over from the source record
    /// (actual − expected, excess past a limit, or trend slope).
    pub value: f64,
    pub percentage: Option<VariancePercent>,
    pub threshold_used: Option<f64>,
    pub expected_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub limit_violated: Option<String>,
}
