//! Heuristic AI-voice scoring over aggregated feature statistics.
//!
//! Synthetic voices show unnaturally small frame-to-frame variation in
//! spectral shape, energy and pitch-class content. Each feature's standard
//! deviation is checked against calibrated bands; a fired band contributes
//! its weight and a named indicator. The raw sum is normalized so that a
//! handful of strong indicators saturates the score.

use crate::features::FeatureVector;

/// One calibrated feature: bands are checked lowest-first and at most one
/// fires per feature.
struct FeatureBands {
    value: fn(&FeatureVector) -> f32,
    bands: &'static [(f32, f32, &'static str)],
}

const BAND_TABLE: &[FeatureBands] = &[
    FeatureBands {
        value: |f| f.centroid_hz.std,
        bands: &[
            (15.0, 1.0, "extreme_spectral_consistency"),
            (35.0, 0.7, "high_spectral_consistency"),
            (70.0, 0.4, "moderate_spectral_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.mfcc_pooled_std,
        bands: &[
            (0.4, 1.2, "extreme_mfcc_consistency"),
            (0.9, 0.9, "high_mfcc_consistency"),
            (1.6, 0.5, "moderate_mfcc_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.zcr.std,
        bands: &[
            (0.004, 0.9, "extreme_zcr_consistency"),
            (0.010, 0.6, "high_zcr_consistency"),
            (0.018, 0.3, "moderate_zcr_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.energy.std,
        bands: &[
            (0.004, 0.9, "extreme_energy_consistency"),
            (0.010, 0.6, "high_energy_consistency"),
            (0.018, 0.3, "moderate_energy_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.rolloff_hz.std,
        bands: &[
            (80.0, 0.8, "extreme_rolloff_consistency"),
            (200.0, 0.5, "high_rolloff_consistency"),
            (400.0, 0.2, "moderate_rolloff_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.bandwidth_hz.std,
        bands: &[
            (40.0, 0.7, "low_bandwidth_variation"),
            (90.0, 0.4, "moderate_bandwidth_variation"),
        ],
    },
    FeatureBands {
        value: |f| f.chroma_pooled_std,
        bands: &[
            (0.025, 0.8, "extreme_chroma_consistency"),
            (0.065, 0.4, "moderate_chroma_consistency"),
        ],
    },
    FeatureBands {
        value: |f| f.flatness.std,
        bands: &[
            (0.02, 0.7, "extreme_flatness_consistency"),
            (0.05, 0.3, "moderate_flatness_consistency"),
        ],
    },
];

/// Thresholds for the "too perfect" indicator count.
const PERFECTION_CHECKS: &[fn(&FeatureVector) -> bool] = &[
    |f| f.centroid_hz.std < 30.0,
    |f| f.mfcc_pooled_std < 0.8,
    |f| f.zcr.std < 0.008,
    |f| f.energy.std < 0.008,
    |f| f.chroma_pooled_std < 0.05,
    |f| f.rolloff_hz.std < 150.0,
    |f| f.bandwidth_hz.std < 70.0,
    |f| f.flatness.std < 0.04,
];

/// Divisor mapping the raw indicator sum into [0,1].
const SCORE_NORMALIZER: f32 = 3.0;

pub(super) struct HeuristicOutcome {
    pub(super) score: f32,
    pub(super) indicators: Vec<&'static str>,
}

pub(super) fn score(features: &FeatureVector) -> HeuristicOutcome {
    let mut raw = 0.0_f32;
    let mut indicators = Vec::new();

    for entry in BAND_TABLE {
        let value = (entry.value)(features);
        for &(threshold, weight, label) in entry.bands {
            if value < threshold {
                raw += weight;
                indicators.push(label);
                break;
            }
        }
    }

    let perfect = PERFECTION_CHECKS
        .iter()
        .filter(|check| check(features))
        .count();
    let (perfection_weight, perfection_label) = match perfect {
        6.. => (1.5, Some("extreme_perfection")),
        5 => (1.0, Some("high_perfection")),
        4 => (0.7, Some("moderate_perfection")),
        3 => (0.4, Some("some_perfection")),
        _ => (0.0, None),
    };
    raw += perfection_weight;
    if let Some(label) = perfection_label {
        indicators.push(label);
    }

    // Combinations that rarely occur together in natural speech.
    if features.centroid_hz.std < 35.0
        && features.rolloff_hz.std < 170.0
        && features.mfcc_pooled_std < 1.0
    {
        raw += 0.9;
        indicators.push("synthetic_signature_combo");
    }
    if features.energy.std < 0.010
        && features.zcr.std < 0.010
        && features.mfcc_pooled_std < 1.2
    {
        raw += 0.8;
        indicators.push("synthetic_energy_pattern");
    }

    HeuristicOutcome {
        score: (raw / SCORE_NORMALIZER).min(1.0),
        indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::stats::SeriesStats;

    fn features_with_stds(spread: f32) -> FeatureVector {
        let wide = |scale: f32| SeriesStats {
            mean: scale,
            std: spread * scale,
            skewness: 0.0,
            kurtosis: 0.0,
            min: 0.0,
            max: scale * 2.0,
        };
        FeatureVector {
            duration_seconds: 5.0,
            sample_rate: 16_000,
            total_frames: 500,
            voiced_frames: 300,
            mfcc_mean: vec![0.0; 20],
            mfcc_std: vec![spread * 10.0; 20],
            mfcc_pooled_std: spread * 10.0,
            centroid_hz: wide(1_500.0),
            rolloff_hz: wide(3_000.0),
            bandwidth_hz: wide(1_200.0),
            flatness: wide(0.2),
            contrast_bands: [2.0; 4],
            contrast: wide(2.0),
            tonnetz_mean: [0.0; 6],
            tonnetz_std: [spread; 6],
            chroma_pooled_std: spread,
            zcr: wide(0.08),
            energy: wide(0.3),
            pitch_hz: wide(160.0),
        }
    }

    #[test]
    fn flat_statistics_saturate_the_score() {
        let outcome = score(&features_with_stds(0.0));
        assert!((outcome.score - 1.0).abs() < 1e-6);
        assert!(outcome.indicators.contains(&"extreme_spectral_consistency"));
        assert!(outcome.indicators.contains(&"extreme_perfection"));
    }

    #[test]
    fn wide_statistics_score_near_zero() {
        let outcome = score(&features_with_stds(0.5));
        assert!(outcome.score < 0.2, "score {}", outcome.score);
        assert!(outcome.indicators.is_empty());
    }

    #[test]
    fn score_never_leaves_unit_interval() {
        for spread in [0.0_f32, 0.001, 0.01, 0.1, 1.0] {
            let outcome = score(&features_with_stds(spread));
            assert!((0.0..=1.0).contains(&outcome.score));
        }
    }
}
