//! AI-voice detection: a three-method ensemble over the shared features.

mod heuristic;
mod pattern;
mod temporal;

use serde::Serialize;
use tracing::debug;

use crate::config::{DetectionWeights, EngineConfig};
use crate::features::{FeatureVector, FrameSeries};

/// Human-readable bucket derived from the combined confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Outcome of the detection ensemble.
///
/// Invariants: the three weights sum to 1.0, each sub-score and the combined
/// confidence lie in [0,1], and `confidence` always equals the weighted sum
/// of the sub-scores.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub heuristic_score: f32,
    pub pattern_score: f32,
    pub temporal_score: f32,
    pub weights: DetectionWeights,
    pub confidence: f32,
    pub is_ai_generated: bool,
    pub risk_level: RiskLevel,
    /// Names of the heuristic bands that fired.
    pub indicators: Vec<&'static str>,
    /// True when the recording was too short for temporal scoring and the
    /// temporal weight was redistributed.
    pub temporal_degraded: bool,
}

pub fn detect(
    features: &FeatureVector,
    series: &FrameSeries,
    config: &EngineConfig,
) -> DetectionResult {
    let heuristic = heuristic::score(features);
    let pattern_score = pattern::score(series);

    let (temporal_score, weights, temporal_degraded) =
        match temporal::score(series, config) {
            temporal::TemporalOutcome::Scored(score) => {
                (score, config.detection_weights, false)
            }
            temporal::TemporalOutcome::TooShort => {
                (0.0, config.detection_weights.without_temporal(), true)
            }
        };

    let confidence = (heuristic.score * weights.heuristic
        + pattern_score * weights.pattern
        + temporal_score * weights.temporal)
        .clamp(0.0, 1.0);
    let is_ai_generated = confidence > config.ai_threshold;
    let risk_level = risk_level(confidence, config);
    debug!(
        heuristic = heuristic.score,
        pattern = pattern_score,
        temporal = temporal_score,
        confidence,
        ?risk_level,
        temporal_degraded,
        "detection ensemble complete"
    );

    DetectionResult {
        heuristic_score: heuristic.score,
        pattern_score,
        temporal_score,
        weights,
        confidence,
        is_ai_generated,
        risk_level,
        indicators: heuristic.indicators,
        temporal_degraded,
    }
}

/// Tier assignment uses strict lower bounds: a confidence of exactly 0.65
/// stays `low` and exactly 0.80 stays `medium`.
fn risk_level(confidence: f32, config: &EngineConfig) -> RiskLevel {
    if confidence > config.high_risk_threshold {
        RiskLevel::High
    } else if confidence > config.ai_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
