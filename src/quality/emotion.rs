//! Rule-based emotion mapping from pitch and energy bands.
//!
//! Each emotion has a prototype point in a four-dimensional normalized
//! feature space (pitch level, pitch variation, energy level, energy
//! variation). The dominant emotion is the nearest prototype; ties resolve
//! in table order. Confidence is the normalized margin between the two
//! closest prototypes.

use serde::Serialize;

use crate::features::FeatureVector;
use crate::features::stats::MIN_STD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Calm,
    Excited,
    Neutral,
}

/// Prototype coordinates: (pitch level, pitch variation, energy level,
/// energy variation), all in [0,1]. Order is the tie-break priority.
const PROTOTYPES: &[(Emotion, [f32; 4])] = &[
    (Emotion::Excited, [0.80, 0.70, 0.80, 0.60]),
    (Emotion::Happy, [0.65, 0.60, 0.60, 0.45]),
    (Emotion::Angry, [0.55, 0.50, 0.90, 0.70]),
    (Emotion::Sad, [0.25, 0.15, 0.20, 0.25]),
    (Emotion::Calm, [0.40, 0.25, 0.40, 0.20]),
    (Emotion::Neutral, [0.50, 0.40, 0.50, 0.40]),
];

/// Feature scales mapping raw units onto prototype space.
const PITCH_LEVEL_RANGE: (f32, f32) = (80.0, 300.0);
const PITCH_VAR_FULL_SCALE: f32 = 60.0;
const ENERGY_FULL_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct EmotionMetrics {
    pub dominant_emotion: Emotion,
    /// Margin between the two closest prototypes, in [0,1].
    pub emotion_confidence: f32,
    pub emotional_range: f32,
    pub emotional_stability: f32,
    pub score: f32,
}

pub(super) fn analyze(features: &FeatureVector) -> EmotionMetrics {
    let point = feature_point(features);
    let (dominant_emotion, confidence) = classify(point);

    let emotional_range = ((point[1] + point[3]) * 0.5).clamp(0.0, 1.0);
    let emotional_stability = (1.0 - emotional_range * 0.8).clamp(0.0, 1.0);
    let score = (0.5 * confidence + 0.25 * emotional_range + 0.25 * emotional_stability)
        .clamp(0.0, 1.0);

    EmotionMetrics {
        dominant_emotion,
        emotion_confidence: confidence,
        emotional_range,
        emotional_stability,
        score,
    }
}

fn feature_point(features: &FeatureVector) -> [f32; 4] {
    let (pitch_lo, pitch_hi) = PITCH_LEVEL_RANGE;
    let pitch_level =
        ((features.pitch_hz.mean - pitch_lo) / (pitch_hi - pitch_lo)).clamp(0.0, 1.0);
    let pitch_var = (features.pitch_hz.std / PITCH_VAR_FULL_SCALE).clamp(0.0, 1.0);
    let energy_level = (features.energy.mean / ENERGY_FULL_SCALE).clamp(0.0, 1.0);
    let energy_cv = if features.energy.mean as f64 > MIN_STD {
        features.energy.std / features.energy.mean
    } else {
        0.0
    };
    let energy_var = energy_cv.clamp(0.0, 1.0);
    [pitch_level, pitch_var, energy_level, energy_var]
}

fn classify(point: [f32; 4]) -> (Emotion, f32) {
    let mut best: Option<(Emotion, f32)> = None;
    let mut second_distance = f32::INFINITY;
    for &(emotion, prototype) in PROTOTYPES {
        let distance = point
            .iter()
            .zip(prototype.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();
        match best {
            Some((_, best_distance)) if distance < best_distance => {
                second_distance = best_distance;
                best = Some((emotion, distance));
            }
            Some(_) => second_distance = second_distance.min(distance),
            None => best = Some((emotion, distance)),
        }
    }
    let (emotion, best_distance) = best.unwrap_or((Emotion::Neutral, 0.0));
    let denom = best_distance + second_distance;
    let confidence = if denom > MIN_STD as f32 && second_distance.is_finite() {
        ((second_distance - best_distance) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (emotion, confidence)
}
