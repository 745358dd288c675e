//! Frame-to-frame pattern analysis of energy and pitch sequences.
//!
//! Natural speech fluctuates: syllables modulate energy and the fundamental
//! wanders. Sequences that evolve too smoothly, or with too little overall
//! spread, push this score upward.

use crate::features::FrameSeries;
use crate::features::stats::{
    self, SeriesStats, coefficient_of_variation, successive_difference_variance,
};

/// Energy coefficient-of-variation bands (value below threshold fires).
const ENERGY_CV_BANDS: &[(f32, f32)] = &[(0.3, 0.8), (0.5, 0.5), (0.7, 0.2)];
/// Voiced pitch standard-deviation bands, in Hz.
const PITCH_STD_BANDS: &[(f32, f32)] = &[(5.0, 0.7), (15.0, 0.4), (30.0, 0.2)];
/// Smoothness ratio (successive-difference variance over series variance)
/// below which the contour counts as mechanically smooth.
const SMOOTHNESS_RATIO: f32 = 0.05;
const SMOOTHNESS_WEIGHT: f32 = 0.3;
/// Minimum voiced frames before pitch statistics are trusted.
const MIN_PITCH_FRAMES: usize = 10;

pub(super) fn score(series: &FrameSeries) -> f32 {
    let mut raw = 0.0_f32;

    let energy_cv = coefficient_of_variation(&series.energy);
    raw += band_weight(ENERGY_CV_BANDS, energy_cv);

    let voiced = series.voiced_pitch();
    if voiced.len() >= MIN_PITCH_FRAMES {
        let pitch_std = SeriesStats::from_series(&voiced).std;
        raw += band_weight(PITCH_STD_BANDS, pitch_std);

        if smoothness_ratio(&voiced) < SMOOTHNESS_RATIO {
            raw += SMOOTHNESS_WEIGHT;
        }
    }

    raw.min(1.0)
}

fn band_weight(bands: &[(f32, f32)], value: f32) -> f32 {
    for &(threshold, weight) in bands {
        if value < threshold {
            return weight;
        }
    }
    0.0
}

/// How much of the series variance survives first-differencing. A wandering
/// contour keeps a substantial share; an interpolated one loses nearly all.
fn smoothness_ratio(values: &[f32]) -> f32 {
    let variance = {
        let stats = SeriesStats::from_series(values);
        (stats.std * stats.std).max(stats::MIN_STD as f32)
    };
    successive_difference_variance(values) / variance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(energy: Vec<f32>, pitch: Vec<f32>) -> FrameSeries {
        let voiced = pitch.iter().map(|&hz| hz > 0.0).collect();
        let frames = energy.len();
        FrameSeries {
            pitch_hz: pitch,
            voiced,
            energy,
            zcr: vec![0.05; frames],
            mfcc: vec![vec![0.0; 20]; frames],
            frames_per_second: 100.0,
        }
    }

    #[test]
    fn flat_energy_and_pitch_score_high() {
        let s = series(vec![0.5; 200], vec![160.0; 200]);
        assert!(score(&s) > 0.7);
    }

    #[test]
    fn varied_energy_and_wandering_pitch_score_low() {
        let energy: Vec<f32> = (0..200)
            .map(|i| if (i / 20) % 2 == 0 { 0.7 } else { 0.05 })
            .collect();
        let pitch: Vec<f32> = (0..200)
            .map(|i| 150.0 + 60.0 * ((i % 13) as f32 - 6.0) / 6.0)
            .collect();
        let s = series(energy, pitch);
        assert!(score(&s) < 0.3, "score {}", score(&s));
    }

    #[test]
    fn too_few_voiced_frames_skips_pitch_terms() {
        let s = series(vec![0.5; 200], vec![0.0; 200]);
        // Only the energy term can contribute.
        assert!(score(&s) <= 0.8);
    }
}
