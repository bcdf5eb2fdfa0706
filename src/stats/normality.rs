//! Normality classification via the Shapiro–Wilk test.
//!
//! Implements Royston's AS R94 approximation (the algorithm behind
//! `scipy.stats.shapiro` and R's `shapiro.test`), valid for samples of
//! 3 to 5000 observations. The p-value transformations use the standard
//! normal quantile/CDF from statrs.

use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::config::defaults::{
    MAX_NORMALITY_SAMPLES, MIN_SAMPLES_FOR_STATS, NORMALITY_P_VALUE_THRESHOLD,
};
use crate::types::Normality;

/// Classification plus the test p-value (0.0 when the test did not run).
#[derive(Debug, Clone, Copy)]
pub struct NormalityTest {
    pub classification: Normality,
    pub p_value: f64,
}

/// Classify a sample's distribution.
///
/// Samples below [`MIN_SAMPLES_FOR_STATS`] observations are
/// `InsufficientData`; zero-range samples (max = min) are `ZeroRange`; both
/// report p = 0.0. Samples above [`MAX_NORMALITY_SAMPLES`] are truncated to
/// their most recent observations before testing (callers pass samples in
/// date order), which keeps the test applicable without dropping the
/// analysis.
pub fn classify(sample: &[f64]) -> NormalityTest {
    let n = sample.len();
    if n < MIN_SAMPLES_FOR_STATS {
        return NormalityTest {
            classification: Normality::InsufficientData,
            p_value: 0.0,
        };
    }

    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min == 0.0 {
        return NormalityTest {
            classification: Normality::ZeroRange,
            p_value: 0.0,
        };
    }

    let tested: &[f64] = if n > MAX_NORMALITY_SAMPLES {
        warn!(
            sample_size = n,
            max = MAX_NORMALITY_SAMPLES,
            "sample exceeds Shapiro-Wilk maximum; testing most recent observations"
        );
        &sample[n - MAX_NORMALITY_SAMPLES..]
    } else {
        sample
    };

    match shapiro_wilk(tested) {
        Some((w, p_value)) => {
            let classification = if p_value > NORMALITY_P_VALUE_THRESHOLD {
                Normality::Normal
            } else {
                Normality::NotNormal
            };
            debug!(n = tested.len(), w, p_value, ?classification, "normality test");
            NormalityTest {
                classification,
                p_value,
            }
        }
        None => {
            // Degenerate input the test can't handle; treat as non-normal so
            // the robust method takes over.
            warn!(n = tested.len(), "Shapiro-Wilk test failed; falling back to robust limits");
            NormalityTest {
                classification: Normality::NotNormal,
                p_value: 0.0,
            }
        }
    }
}

/// Shapiro–Wilk W statistic and p-value (AS R94).
///
/// Returns `None` when the statistic is undefined (zero variance) or the
/// standard normal distribution cannot be constructed.
fn shapiro_wilk(sample: &[f64]) -> Option<(f64, f64)> {
    let n = sample.len();
    if n < 3 {
        return None;
    }
    let std_normal = Normal::new(0.0, 1.0).ok()?;

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    // Blom scores: expected values of normal order statistics.
    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| std_normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let ss: f64 = m.iter().map(|v| v * v).sum();

    // Weights: normalized scores with polynomial-corrected tails.
    let rsn = 1.0 / nf.sqrt();
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -std::f64::consts::FRAC_1_SQRT_2;
        a[2] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let a_n = m[n - 1] / ss.sqrt()
            + rsn * (0.221157 + rsn * (-0.147981 + rsn * (-2.071190 + rsn * (4.434685 + rsn * -2.706056))));
        if n > 5 {
            let a_n1 = m[n - 2] / ss.sqrt()
                + rsn * (0.042981 + rsn * (-0.293762 + rsn * (-1.752461 + rsn * (5.682633 + rsn * -3.582633))));
            let phi = (ss - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
                / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
            if phi <= 0.0 {
                return None;
            }
            let phi_sqrt = phi.sqrt();
            for i in 2..n - 2 {
                a[i] = m[i] / phi_sqrt;
            }
            a[n - 1] = a_n;
            a[n - 2] = a_n1;
            a[0] = -a_n;
            a[1] = -a_n1;
        } else {
            let phi = (ss - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
            if phi <= 0.0 {
                return None;
            }
            let phi_sqrt = phi.sqrt();
            for i in 1..n - 1 {
                a[i] = m[i] / phi_sqrt;
            }
            a[n - 1] = a_n;
            a[0] = -a_n;
        }
    }

    let x_mean = x.iter().sum::<f64>() / nf;
    let denom: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();
    if denom <= 0.0 {
        return None;
    }
    let numer: f64 = a.iter().zip(x.iter()).map(|(ai, xi)| ai * xi).sum::<f64>().powi(2);
    let w = (numer / denom).min(1.0);

    Some((w, p_value_for_w(w, n, &std_normal)))
}

/// Royston's normalizing transformation of W to a p-value.
fn p_value_for_w(w: f64, n: usize, std_normal: &Normal) -> f64 {
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }

    if n == 3 {
        // Exact small-sample distribution.
        let stqr = (0.75f64).sqrt().asin();
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - stqr);
        return p.clamp(0.0, 1.0);
    }

    let nf = n as f64;
    let z = if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        let y = w1.ln();
        if y >= gamma {
            // Off the chart: overwhelming evidence against normality.
            return 0.0;
        }
        let y = -(gamma - y).ln();
        let mu = 0.5440 + nf * (-0.39978 + nf * (0.025054 + nf * -0.000_671_4));
        let sigma = (1.3822 + nf * (-0.77857 + nf * (0.062767 + nf * -0.002_032_2))).exp();
        (y - mu) / sigma
    } else {
        let u = nf.ln();
        let mu = -1.5861 + u * (-0.31082 + u * (-0.083751 + u * 0.003_891_5));
        let sigma = (-0.4803 + u * (-0.082676 + u * 0.003_030_2)).exp();
        (w1.ln() - mu) / sigma
    };

    (1.0 - std_normal.cdf(z)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn too_few_samples_is_insufficient_data() {
        let result = classify(&[1.0, 2.0]);
        assert_eq!(result.classification, Normality::InsufficientData);
        assert!(result.p_value.abs() < f64::EPSILON);
    }

    #[test]
    fn identical_values_are_zero_range() {
        let result = classify(&[8.0; 24]);
        assert_eq!(result.classification, Normality::ZeroRange);
        assert!(result.p_value.abs() < f64::EPSILON);
    }

    #[test]
    fn gaussian_shaped_sample_classifies_normal() {
        // Normal order-statistic quantiles: the most normal-shaped sample of
        // size n there is, and fully deterministic.
        let normal = Normal::new(10.0, 2.0).unwrap();
        let sample: Vec<f64> = (1..=200)
            .map(|i| normal.inverse_cdf((f64::from(i) - 0.375) / 200.25))
            .collect();

        let result = classify(&sample);
        assert_eq!(result.classification, Normality::Normal, "p = {}", result.p_value);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn heavily_skewed_sample_classifies_not_normal() {
        // Exponential-ish: x^4 over a uniform grid is strongly right-skewed.
        let sample: Vec<f64> = (1..=100).map(|i| (f64::from(i) / 10.0).powi(4)).collect();

        let result = classify(&sample);
        assert_eq!(result.classification, Normality::NotNormal, "p = {}", result.p_value);
        assert!(result.p_value <= 0.05);
    }

    #[test]
    fn bimodal_sample_classifies_not_normal() {
        let mut sample = vec![1.0, 1.1, 0.9, 1.05, 0.95, 1.02, 0.98, 1.04, 0.97, 1.01];
        sample.extend([9.0, 9.1, 8.9, 9.05, 8.95, 9.02, 8.98, 9.04, 8.97, 9.01]);

        let result = classify(&sample);
        assert_eq!(result.classification, Normality::NotNormal);
    }

    #[test]
    fn oversized_sample_still_classifies() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample: Vec<f64> = (0..6000)
            .map(|_| (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>())
            .collect();

        // Must not panic and must run the test on the truncated tail.
        let result = classify(&sample);
        assert!(matches!(
            result.classification,
            Normality::Normal | Normality::NotNormal
        ));
    }

    #[test]
    fn w_statistic_near_one_for_linear_spacing() {
        // Evenly spaced data is close enough to normal order statistics that
        // W should be high even when p rejects; sanity-check W's range.
        let sample: Vec<f64> = (0..50).map(f64::from).collect();
        let (w, p) = shapiro_wilk(&sample).unwrap();
        assert!(w > 0.9 && w <= 1.0, "w = {w}");
        assert!((0.0..=1.0).contains(&p));
    }
}
