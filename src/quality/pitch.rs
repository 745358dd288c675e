//! Pitch-group metrics: level, variation, range and contour shape.

use serde::Serialize;

use crate::features::stats::{MIN_STD, SeriesStats};
use crate::features::{FeatureVector, FrameSeries};

/// Pitch variation (Hz) considered ideal for engaging speech; the adequacy
/// term falls off linearly either side of it.
const IDEAL_VARIATION_HZ: f32 = 35.0;

#[derive(Debug, Clone, Serialize)]
pub struct PitchMetrics {
    pub average_pitch_hz: f32,
    pub pitch_variation_hz: f32,
    pub pitch_range_semitones: f32,
    /// Inverse of normalized pitch variance, in [0,1].
    pub stability: f32,
    /// Inverse of the normalized second-difference magnitude, in [0,1].
    pub contour_smoothness: f32,
    pub score: f32,
}

pub(super) fn analyze(features: &FeatureVector, series: &FrameSeries) -> PitchMetrics {
    let stats = features.pitch_hz;
    let voiced = series.voiced_pitch();

    let range_semitones = if stats.min > 0.0 && stats.max > stats.min {
        12.0 * (stats.max / stats.min).log2()
    } else {
        0.0
    };
    let cv = if stats.mean > MIN_STD as f32 {
        stats.std / stats.mean
    } else {
        0.0
    };
    let stability = 1.0 / (1.0 + cv * 4.0);
    let contour_smoothness = smoothness(&voiced, stats);
    let adequacy =
        (1.0 - (stats.std - IDEAL_VARIATION_HZ).abs() / IDEAL_VARIATION_HZ).clamp(0.0, 1.0);
    let score = (0.4 * stability + 0.3 * contour_smoothness + 0.3 * adequacy).clamp(0.0, 1.0);

    PitchMetrics {
        average_pitch_hz: stats.mean,
        pitch_variation_hz: stats.std,
        pitch_range_semitones: range_semitones,
        stability,
        contour_smoothness,
        score,
    }
}

/// Mean absolute second difference of the voiced contour, normalized by the
/// mean pitch; large values mean a jagged contour.
fn smoothness(voiced: &[f32], stats: SeriesStats) -> f32 {
    if voiced.len() < 3 || stats.mean <= 0.0 {
        return 1.0;
    }
    let mut total = 0.0_f64;
    for window in voiced.windows(3) {
        total += (window[2] - 2.0 * window[1] + window[0]).abs() as f64;
    }
    let mean_second_diff = total / (voiced.len() - 2) as f64;
    let normalized = mean_second_diff / stats.mean as f64;
    (1.0 / (1.0 + normalized * 20.0)) as f32
}
