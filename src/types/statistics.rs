//! Control limits and per-group statistical summaries.

use serde::{Deserialize, Serialize};

/// How control limits were derived for a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMethod {
    /// Normally distributed data: mean ± multiplier × std.
    Normal,
    /// Fallback for everything else: median ± multiplier × MAD.
    Robust,
}

/// Outcome of the normality classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normality {
    /// Fewer samples than the test needs.
    InsufficientData,
    /// All values identical; the test is undefined.
    ZeroRange,
    Normal,
    NotNormal,
}

impl Normality {
    /// Whether the sample passed as normally distributed.
    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Statistical control band for one grouped sample.
///
/// Computed fresh per (facility, role) grouping per run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Center line: mean (normal method) or median (robust method).
    pub center: f64,
    /// Upper control limit.
    pub upper: f64,
    /// Lower control limit; floored at 0 since hours cannot be negative.
    pub lower: f64,
    /// Dispersion measure: std (normal) or MAD (robust).
    pub dispersion: f64,
    pub method: ControlMethod,
    /// P-value from the normality test (0.0 when the test did not run).
    pub normality_p_value: f64,
    /// Number of observations the limits were computed from.
    pub sample_size: usize,
}

/// Descriptive statistics for one grouped sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub mad: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Which control bound a value fell outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolatedBound {
    Upper,
    Lower,
}

impl ViolatedBound {
    pub fn label(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }
}

/// One observation outside the control band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlViolation {
    /// Index of the observation within the scanned sample.
    pub index: usize,
    /// The observed value.
    pub value: f64,
    pub bound: ViolatedBound,
    /// The limit value that was exceeded.
    pub limit: f64,
    /// Absolute distance past the limit.
    pub magnitude: f64,
}

/// Per-(facility, role) statistical summary returned alongside exceptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub facility: String,
    pub role: String,
    pub stats: DescriptiveStats,
    pub limits: ControlLimits,
}
