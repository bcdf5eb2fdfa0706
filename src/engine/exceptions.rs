//! Exception compilation: merge variance and trend findings into one scored,
//! deterministically ordered stream.
//!
//! The output ordering — facility ascending, severity descending, date
//! descending — is a contract with downstream reporting: it defines what
//! "top N" means.

use tracing::info;

use crate::config::defaults::{
    SEVERITY_CEILING, SIGNIFICANCE_THRESHOLD, STATISTICAL_SEVERITY_SCALE, TREND_R_SQUARED_WEIGHT,
};
use crate::types::{
    ExceptionKind, ExceptionRecord, TrendDirection, TrendRecord, VarianceKind, VariancePercent,
    VarianceRecord,
};

/// Default severity when a model variance carries no percentage.
const MODEL_SEVERITY_DEFAULT: f64 = 50.0;

/// Default severity when a statistical variance carries no magnitude.
const STATISTICAL_SEVERITY_DEFAULT: f64 = 60.0;

/// Compiles variance and trend records into the unified exception stream.
pub struct ExceptionCompiler;

impl ExceptionCompiler {
    /// Compile, score, describe, and sort.
    ///
    /// Every flagged variance record and every significant non-stable trend
    /// becomes exactly one exception.
    pub fn compile(variances: &[VarianceRecord], trends: &[TrendRecord]) -> Vec<ExceptionRecord> {
        let mut exceptions: Vec<ExceptionRecord> = variances
            .iter()
            .filter(|v| v.is_exception)
            .map(Self::from_variance)
            .collect();

        exceptions.extend(
            trends
                .iter()
                .filter(|t| t.is_significant && t.direction != TrendDirection::Stable)
                .map(Self::from_trend),
        );

        // Contract ordering: facility ↑, severity ↓, date ↓.
        exceptions.sort_by(|a, b| {
            a.facility
                .cmp(&b.facility)
                .then_with(|| b.severity.total_cmp(&a.severity))
                .then_with(|| b.date.cmp(&a.date))
        });

        info!(count = exceptions.len(), "exceptions compiled");
        exceptions
    }

    fn from_variance(variance: &VarianceRecord) -> ExceptionRecord {
        ExceptionRecord {
            facility: variance.facility.clone(),
            role: variance.role.clone(),
            date: variance.date,
            kind: match variance.kind {
                VarianceKind::Model => ExceptionKind::Model,
                VarianceKind::Statistical => ExceptionKind::Statistical,
            },
            severity: Self::variance_severity(variance),
            description: Self::variance_description(variance),
            value: variance.value,
            percentage: variance.percentage,
            threshold_used: variance.threshold_used,
            expected_hours: variance.expected_hours,
            actual_hours: variance.actual_hours,
            limit_violated: variance.limit_violated.clone(),
        }
    }

    fn from_trend(trend: &TrendRecord) -> ExceptionRecord {
        ExceptionRecord {
            facility: trend.facility.clone(),
            role: trend.role.clone(),
            date: trend.window_end,
            kind: ExceptionKind::Trend,
            severity: Self::trend_severity(trend),
            description: Self::trend_description(trend),
            value: trend.slope,
            percentage: None,
            threshold_used: Some(SIGNIFICANCE_THRESHOLD),
            expected_hours: None,
            actual_hours: None,
            limit_violated: Some(format!("Significant {} trend", trend.direction)),
        }
    }

    /// Severity for a variance record, on the 0–100 scale.
    fn variance_severity(variance: &VarianceRecord) -> f64 {
        match variance.kind {
            VarianceKind::Model => variance.percentage.map_or(MODEL_SEVERITY_DEFAULT, |pct| {
                pct.severity_magnitude().min(SEVERITY_CEILING)
            }),
            VarianceKind::Statistical => {
                if variance.value.is_finite() {
                    (variance.value.abs() * STATISTICAL_SEVERITY_SCALE).min(SEVERITY_CEILING)
                } else {
                    STATISTICAL_SEVERITY_DEFAULT
                }
            }
        }
    }

    /// Severity for a trend: statistical confidence plus fit quality.
    fn trend_severity(trend: &TrendRecord) -> f64 {
        let base = (1.0 - trend.p_value) * 100.0;
        let fit_bonus = trend.r_squared * TREND_R_SQUARED_WEIGHT;
        (base + fit_bonus).min(SEVERITY_CEILING)
    }

    fn variance_description(variance: &VarianceRecord) -> String {
        match variance.kind {
            VarianceKind::Model => {
                let threshold = variance.threshold_used.unwrap_or_default();
                match variance.percentage {
                    Some(VariancePercent::Defined(pct)) => {
                        let direction = if pct > 0.0 { "above" } else { "below" };
                        format!(
                            "Actual hours {direction} model by {:.1}% (threshold: {threshold:.1}%)",
                            pct.abs()
                        )
                    }
                    Some(VariancePercent::Unbounded) => format!(
                        "Actual hours recorded where model expects none (threshold: {threshold:.1}%)"
                    ),
                    None => "Variance from model hours detected".to_string(),
                }
            }
            VarianceKind::Statistical => format!(
                "Statistical control limit violation: {}",
                variance.limit_violated.as_deref().unwrap_or("out of control")
            ),
        }
    }

    fn trend_description(trend: &TrendRecord) -> String {
        format!(
            "Significant {} trend over {} weeks (p-value: {:.4}, R²: {:.3})",
            trend.direction, trend.weeks_analyzed, trend.p_value, trend.r_squared
        )
    }
}
