//! Scalar statistics over per-frame feature sequences.

use serde::{Deserialize, Serialize};

/// Aggregate descriptors for one per-frame series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f32,
    pub std: f32,
    pub skewness: f32,
    pub kurtosis: f32,
    pub min: f32,
    pub max: f32,
}

impl SeriesStats {
    pub fn zero() -> Self {
        Self { mean: 0.0, std: 0.0, skewness: 0.0, kurtosis: 0.0, min: 0.0, max: 0.0 }
    }

    pub fn from_series(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::zero();
        }
        let n = values.len() as f64;
        let mean = values.iter().copied().map(f64::from).sum::<f64>() / n;
        let mut m2 = 0.0_f64;
        let mut m3 = 0.0_f64;
        let mut m4 = 0.0_f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in values {
            let d = v as f64 - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
            min = min.min(v);
            max = max.max(v);
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;
        let std = m2.max(0.0).sqrt();
        // Zero-variance series get zero shape moments rather than a division
        // by zero; the floor mirrors the minimum-variance policy used across
        // the scoring code.
        let (skewness, kurtosis) = if std > MIN_STD {
            (m3 / (std * std * std), m4 / (m2 * m2) - 3.0)
        } else {
            (0.0, 0.0)
        };
        Self {
            mean: mean as f32,
            std: std as f32,
            skewness: skewness as f32,
            kurtosis: kurtosis as f32,
            min,
            max,
        }
    }
}

/// Floor substituted for vanishing variance in ratio computations.
pub const MIN_STD: f64 = 1e-9;

/// Variance of successive-frame differences; the pattern detector uses this
/// to spot sequences that evolve too smoothly to be human.
pub fn successive_difference_variance(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f32> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let stats = SeriesStats::from_series(&diffs);
    stats.std * stats.std
}

/// Pearson correlation between two equal-length vectors, 0.0 on degenerate
/// input (length mismatch, fewer than two points, zero variance).
pub fn pearson_correlation(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().copied().map(f64::from).sum::<f64>() / n;
    let mean_b = b.iter().copied().map(f64::from).sum::<f64>() / n;
    let mut cov = 0.0_f64;
    let mut var_a = 0.0_f64;
    let mut var_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denom = (var_a * var_b).sqrt().max(MIN_STD);
    (cov / denom).clamp(-1.0, 1.0) as f32
}

/// Mean of a slice, 0.0 when empty.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().copied().map(f64::from).sum::<f64>() / values.len() as f64) as f32
}

/// Coefficient of variation (std/mean) with the zero-mean case floored.
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    let stats = SeriesStats::from_series(values);
    if stats.mean.abs() as f64 <= MIN_STD {
        return 0.0;
    }
    stats.std / stats.mean.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_has_zero_spread_and_shape() {
        let stats = SeriesStats::from_series(&[0.5; 32]);
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 0.5);
    }

    #[test]
    fn symmetric_series_has_near_zero_skew() {
        let values: Vec<f32> = (0..100).map(|i| (i as f32 / 99.0) - 0.5).collect();
        let stats = SeriesStats::from_series(&values);
        assert!(stats.skewness.abs() < 1e-4);
        assert!(stats.std > 0.0);
    }

    #[test]
    fn correlation_of_identical_vectors_is_one() {
        let v = [0.1_f32, 0.4, 0.2, 0.9, 0.3];
        assert!((pearson_correlation(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn correlation_of_inverted_vectors_is_minus_one() {
        let a = [0.1_f32, 0.4, 0.2, 0.9, 0.3];
        let b: Vec<f32> = a.iter().map(|v| -v).collect();
        assert!((pearson_correlation(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_ramp_has_lower_diff_variance_than_jumps() {
        let ramp: Vec<f32> = (0..50).map(|i| i as f32 * 0.01).collect();
        let jumpy: Vec<f32> = (0..50).map(|i| if i % 2 == 0 { 0.0 } else { 0.5 }).collect();
        assert!(successive_difference_variance(&ramp) < successive_difference_variance(&jumpy));
    }
}
