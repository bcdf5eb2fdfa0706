//! Data-quality events captured during ingestion.

use serde::{Deserialize, Serialize};

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    InvalidDate,
    InvalidHours,
    NegativeHours,
    MissingValue,
    InvalidDayNumber,
}

impl QualityIssue {
    pub fn label(self) -> &'static str {
        match self {
            Self::InvalidDate => "invalid date",
            Self::InvalidHours => "invalid hours value",
            Self::NegativeHours => "negative hours",
            Self::MissingValue => "missing value",
            Self::InvalidDayNumber => "invalid day number",
        }
    }
}

/// One captured data-quality problem.
///
/// The offending row is excluded from analysis; the event is returned to
/// the caller so bad feeds are visible instead of silently shrinking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityEvent {
    /// 1-based data row index (header excluded), matching spreadsheet rows.
    pub row: usize,
    pub facility: Option<String>,
    pub role: Option<String>,
    /// Column the problem was found in.
    pub field: String,
    /// The raw text that failed to parse (empty for missing values).
    pub raw_value: String,
    pub issue: QualityIssue,
}

impl std::fmt::Display for DataQualityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: {} in '{}' (value: '{}')",
            self.row,
            self.issue.label(),
            self.field,
            self.raw_value
        )
    }
}
