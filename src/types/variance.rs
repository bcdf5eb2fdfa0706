//! Variance records emitted by the three detection algorithms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which detector produced a variance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceKind {
    /// Deviation from the expected-hours model.
    Model,
    /// Out-of-control point against computed control limits.
    Statistical,
}

/// Percentage deviation from the model, as a tagged value.
///
/// `Unbounded` is the "model expects 0 hours but hours were worked" case:
/// the deviation has no meaningful percentage, but it must still trip any
/// finite threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariancePercent {
    Defined(f64),
    Unbounded,
}

impl VariancePercent {
    /// Percentage variance of `actual` against `expected`.
    ///
    /// expected == 0 and actual == 0 is defined as exactly 0% (no deviation);
    /// expected == 0 with actual > 0 is `Unbounded`. Never NaN, never panics.
    pub fn from_actual_expected(actual: f64, expected: f64) -> Self {
        if expected == 0.0 {
            if actual == 0.0 {
                Self::Defined(0.0)
            } else {
                Self::Unbounded
            }
        } else {
            Self::Defined((actual - expected) / expected * 100.0)
        }
    }

    /// Whether |percentage| exceeds a finite threshold. `Unbounded` always does.
    pub fn exceeds(self, threshold: f64) -> bool {
        match self {
            Self::Defined(pct) => pct.abs() > threshold,
            Self::Unbounded => true,
        }
    }

    /// Magnitude used for severity scoring, capped later at 100.
    pub fn severity_magnitude(self) -> f64 {
        match self {
            Self::Defined(pct) => pct.abs(),
            Self::Unbounded => f64::INFINITY,
        }
    }

    pub fn as_defined(self) -> Option<f64> {
        match self {
            Self::Defined(pct) => Some(pct),
            Self::Unbounded => None,
        }
    }
}

impl std::fmt::Display for VariancePercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defined(pct) => write!(f, "{pct:.1}%"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// One variance observation flagged by a detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRecord {
    pub facility: String,
    pub role: String,
    pub date: NaiveDate,
    pub kind: VarianceKind,
    /// Signed magnitude: actual − expected for model variances, distance
    /// past the violated limit for statistical variances.
    pub value: f64,
    /// Group-level percentage deviation (model variances only).
    pub percentage: Option<VariancePercent>,
    pub is_exception: bool,
    /// Threshold that was applied, when one applies.
    pub threshold_used: Option<f64>,
    pub expected_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    /// Which limit was violated, e.g. "upper control limit".
    pub limit_violated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_expected_zero_actual_is_defined_zero() {
        let pct = VariancePercent::from_actual_expected(0.0, 0.0);
        assert_eq!(pct, VariancePercent::Defined(0.0));
        assert!(!pct.exceeds(15.0));
    }

    #[test]
    fn zero_expected_positive_actual_is_unbounded() {
        let pct = VariancePercent::from_actual_expected(8.0, 0.0);
        assert_eq!(pct, VariancePercent::Unbounded);
        assert!(pct.exceeds(15.0));
        assert!(pct.exceeds(100.0));
    }

    #[test]
    fn defined_percentage_math() {
        let pct = VariancePercent::from_actual_expected(46.0, 40.0);
        match pct {
            VariancePercent::Defined(v) => assert!((v - 15.0).abs() < 1e-9),
            VariancePercent::Unbounded => panic!("expected defined percentage"),
        }
        // 15.0 is not strictly greater than the 15.0 threshold
        assert!(!pct.exceeds(15.0));
        assert!(pct.exceeds(14.9));
    }

    #[test]
    fn negative_deviation_uses_absolute_value_against_threshold() {
        let pct = VariancePercent::from_actual_expected(30.0, 40.0);
        assert!(pct.exceeds(20.0));
        assert!(!pct.exceeds(30.0));
    }

    #[test]
    fn display_formats() {
        assert_eq!(VariancePercent::Defined(23.44).to_string(), "23.4%");
        assert_eq!(VariancePercent::Unbounded.to_string(), "unbounded");
    }
}
