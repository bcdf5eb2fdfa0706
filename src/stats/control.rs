//! Control-limit calculation and out-of-control scanning.

use tracing::debug;

use crate::config::defaults::CONTROL_LIMIT_MULTIPLIER;
use crate::stats::{descriptive, normality};
use crate::types::{ControlLimits, ControlMethod, ControlViolation, ViolatedBound};

/// Compute control limits for a sample, choosing the method by normality.
///
/// Normal samples get mean ± 3σ; everything else (not normal, too few
/// points, zero range) falls back to the robust median ± 3·MAD band. The
/// lower limit is floored at 0 — hours cannot be negative. An empty sample
/// yields all-zero limits with the normal method as a safe default.
pub fn control_limits(sample: &[f64]) -> ControlLimits {
    if sample.is_empty() {
        return ControlLimits {
            center: 0.0,
            upper: 0.0,
            lower: 0.0,
            dispersion: 0.0,
            method: ControlMethod::Normal,
            normality_p_value: 0.0,
            sample_size: 0,
        };
    }

    let test = normality::classify(sample);

    let (center, dispersion, method) = if test.classification.is_normal() {
        (
            descriptive::mean(sample),
            descriptive::std_dev(sample),
            ControlMethod::Normal,
        )
    } else {
        (
            descriptive::median(sample),
            descriptive::mad(sample),
            ControlMethod::Robust,
        )
    };

    let upper = center + CONTROL_LIMIT_MULTIPLIER * dispersion;
    let lower = (center - CONTROL_LIMIT_MULTIPLIER * dispersion).max(0.0);

    debug!(?method, center, upper, lower, "control limits");

    ControlLimits {
        center,
        upper,
        lower,
        dispersion,
        method,
        normality_p_value: test.p_value,
        sample_size: sample.len(),
    }
}

/// Scan a sample for values outside the control band.
///
/// Indices in the result refer to positions in `sample`, letting the caller
/// map violations back to dated observations.
pub fn detect_violations(sample: &[f64], limits: &ControlLimits) -> Vec<ControlViolation> {
    sample
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let (bound, limit) = if value > limits.upper {
                (ViolatedBound::Upper, limits.upper)
            } else if value < limits.lower {
                (ViolatedBound::Lower, limits.lower)
            } else {
                return None;
            };
            Some(ControlViolation {
                index,
                value,
                bound,
                limit,
                magnitude: (value - limit).abs(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Normality;

    #[test]
    fn empty_sample_yields_safe_defaults() {
        let limits = control_limits(&[]);
        assert_eq!(limits.method, ControlMethod::Normal);
        assert!(limits.center.abs() < f64::EPSILON);
        assert!(limits.upper.abs() < f64::EPSILON);
        assert!(limits.lower.abs() < f64::EPSILON);
        assert_eq!(limits.sample_size, 0);
    }

    #[test]
    fn zero_range_collapses_band_to_center() {
        let sample = [12.0; 10];
        let test = normality::classify(&sample);
        assert_eq!(test.classification, Normality::ZeroRange);

        let limits = control_limits(&sample);
        assert_eq!(limits.method, ControlMethod::Robust);
        assert!(limits.dispersion.abs() < f64::EPSILON);
        assert!((limits.upper - 12.0).abs() < f64::EPSILON);
        assert!((limits.lower - 12.0).abs() < f64::EPSILON);
        assert!((limits.center - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_sample_falls_back_to_robust() {
        let limits = control_limits(&[4.0, 8.0]);
        assert_eq!(limits.method, ControlMethod::Robust);
        assert!((limits.center - 6.0).abs() < 1e-12);
    }

    #[test]
    fn lower_limit_floored_at_zero() {
        // Center near zero with spread: center - 3·dispersion would go negative.
        let sample = [0.5, 1.0, 2.0, 0.0, 3.0, 1.5, 0.5, 2.5, 1.0, 0.0];
        let limits = control_limits(&sample);
        assert!(limits.lower >= 0.0);
    }

    #[test]
    fn violations_tag_bound_and_magnitude() {
        let limits = ControlLimits {
            center: 10.0,
            upper: 13.0,
            lower: 7.0,
            dispersion: 1.0,
            method: ControlMethod::Normal,
            normality_p_value: 0.5,
            sample_size: 5,
        };
        let sample = [10.0, 14.5, 6.0, 13.0, 7.0];
        let violations = detect_violations(&sample, &limits);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].index, 1);
        assert_eq!(violations[0].bound, ViolatedBound::Upper);
        assert!((violations[0].magnitude - 1.5).abs() < 1e-12);
        assert_eq!(violations[1].index, 2);
        assert_eq!(violations[1].bound, ViolatedBound::Lower);
        assert!((violations[1].magnitude - 1.0).abs() < 1e-12);
        // Values exactly on a limit are in control.
    }

    #[test]
    fn in_control_sample_has_no_violations() {
        let sample = [10.0, 10.5, 9.5, 10.2, 9.8, 10.1, 9.9, 10.3, 9.7, 10.0];
        let limits = control_limits(&sample);
        assert!(detect_violations(&sample, &limits).is_empty());
    }
}
