//! Clarity-group metrics: spectral sharpness and loudness steadiness.

use serde::Serialize;

use crate::features::FeatureVector;
use crate::features::stats::MIN_STD;

/// Spectral contrast (log peak-to-valley) that maps to full sharpness.
const CONTRAST_FULL_SCALE: f32 = 6.0;
/// MFCC frame-to-frame spread that maps to full articulation movement.
const ARTICULATION_FULL_SCALE: f32 = 5.0;
/// Mean frame energy that maps to full projection.
const PROJECTION_FULL_SCALE: f32 = 0.4;

#[derive(Debug, Clone, Serialize)]
pub struct ClarityMetrics {
    pub clarity_score: f32,
    pub pronunciation: f32,
    pub enunciation: f32,
    pub projection: f32,
}

pub(super) fn analyze(features: &FeatureVector) -> ClarityMetrics {
    let mean_contrast = features.contrast_bands.iter().sum::<f32>()
        / features.contrast_bands.len() as f32;
    let sharpness = (mean_contrast / CONTRAST_FULL_SCALE).clamp(0.0, 1.0);
    let articulation = (features.mfcc_pooled_std / ARTICULATION_FULL_SCALE).clamp(0.0, 1.0);

    let energy_cv = if features.energy.mean as f64 > MIN_STD {
        features.energy.std / features.energy.mean
    } else {
        0.0
    };
    let energy_consistency = (1.0 - energy_cv).clamp(0.0, 1.0);

    let pronunciation = (0.6 * sharpness + 0.4 * articulation).clamp(0.0, 1.0);
    let enunciation = (0.5 * sharpness + 0.5 * energy_consistency).clamp(0.0, 1.0);
    let projection = (features.energy.mean / PROJECTION_FULL_SCALE).clamp(0.0, 1.0);
    let clarity_score = ((pronunciation + enunciation + projection) / 3.0).clamp(0.0, 1.0);

    ClarityMetrics {
        clarity_score,
        pronunciation,
        enunciation,
        projection,
    }
}
