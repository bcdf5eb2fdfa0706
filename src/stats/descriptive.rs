//! Descriptive statistics over a numeric sample.

use crate::types::DescriptiveStats;

/// Arithmetic mean; 0.0 for an empty sample.
pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample median; 0.0 for an empty sample.
pub fn median(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n−1 denominator); 0.0 for fewer than 2 points.
pub fn std_dev(sample: &[f64]) -> f64 {
    let n = sample.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(sample);
    let sum_sq: f64 = sample.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Median absolute deviation: median(|x − median(x)|); 0.0 for an empty sample.
pub fn mad(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let med = median(sample);
    let deviations: Vec<f64> = sample.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

/// Full descriptive summary of a sample.
pub fn describe(sample: &[f64]) -> DescriptiveStats {
    if sample.is_empty() {
        return DescriptiveStats::default();
    }
    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    DescriptiveStats {
        n: sample.len(),
        mean: mean(sample),
        median: median(sample),
        std_dev: std_dev(sample),
        mad: mad(sample),
        min,
        max,
        range: max - min,
    }
}
