//! Ordinary least-squares trend fitting with significance testing.
//!
//! The p-value comes from the t-statistic of the correlation coefficient
//! against a Student's t distribution with n−2 degrees of freedom
//! (two-tailed), via statrs.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// OLS fit of y on x.
#[derive(Debug, Clone, Copy)]
pub struct LinearTrend {
    pub slope: f64,
    /// Two-tailed p-value for slope ≠ 0; 1.0 when the fit is undefined.
    pub p_value: f64,
    pub r_squared: f64,
}

impl LinearTrend {
    /// The "no information" fit: flat, insignificant.
    const fn undefined() -> Self {
        Self {
            slope: 0.0,
            p_value: 1.0,
            r_squared: 0.0,
        }
    }
}

/// Fit hours on day-offset. Mismatched or sub-2-point inputs return the
/// undefined fit rather than an error; a single noisy group must never
/// abort the batch.
pub fn linear_trend(x: &[f64], y: &[f64]) -> LinearTrend {
    let n = x.len();
    if n != y.len() || n < 2 {
        return LinearTrend::undefined();
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        // All observations on the same day; no axis to regress over.
        return LinearTrend::undefined();
    }

    let slope = sxy / sxx;

    if syy == 0.0 {
        // Perfectly flat response: zero slope, no significance.
        return LinearTrend {
            slope: 0.0,
            p_value: 1.0,
            r_squared: 0.0,
        };
    }

    let r = sxy / (sxx * syy).sqrt();
    let r_squared = r * r;

    LinearTrend {
        slope,
        p_value: p_value_for_r(r, n),
        r_squared,
    }
}

/// Two-tailed p-value for a correlation coefficient:
/// t = r·√(n−2) / √(1−r²) against StudentsT(n−2).
fn p_value_for_r(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_positive_slope_is_significant() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 5.0).collect();

        let fit = linear_trend(&x, &y);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!(fit.p_value < 0.05);
        assert!((fit.r_squared - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perfect_negative_slope() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 100.0 - 3.0 * v).collect();

        let fit = linear_trend(&x, &y);
        assert!((fit.slope + 3.0).abs() < 1e-9);
        assert!(fit.p_value < 0.05);
    }

    #[test]
    fn flat_series_has_zero_slope_and_no_significance() {
        let x: Vec<f64> = (0..50).map(f64::from).collect();
        let y = vec![36.0; 50];

        let fit = linear_trend(&x, &y);
        assert!(fit.slope.abs() < f64::EPSILON);
        assert!((fit.p_value - 1.0).abs() < f64::EPSILON);
        assert!(fit.r_squared.abs() < f64::EPSILON);
    }

    #[test]
    fn noisy_data_without_trend_is_insignificant() {
        let x: Vec<f64> = (0..40).map(f64::from).collect();
        // Alternating noise around a constant: negligible correlation with x.
        let y: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 30.0 } else { 30.5 })
            .collect();

        let fit = linear_trend(&x, &y);
        assert!(fit.p_value > 0.05, "p = {}", fit.p_value);
    }

    #[test]
    fn degenerate_inputs_return_undefined_fit() {
        let fit = linear_trend(&[1.0], &[2.0]);
        assert!(fit.slope.abs() < f64::EPSILON);
        assert!((fit.p_value - 1.0).abs() < f64::EPSILON);

        let fit = linear_trend(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!((fit.p_value - 1.0).abs() < f64::EPSILON);

        // Same x everywhere: no axis.
        let fit = linear_trend(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]);
        assert!((fit.p_value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn p_value_magnitude_sanity() {
        // r = 0.5 at n = 30 is comfortably significant; r = 0.2 is not.
        assert!(p_value_for_r(0.5, 30) < 0.01);
        assert!(p_value_for_r(0.2, 30) > 0.2);
    }
}
