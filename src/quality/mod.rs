//! Voice quality engine: scores delivery across five metric groups.
//!
//! Each group is computed by its own analyzer from the shared feature
//! vector and frame series. The overall score is always recomputed from
//! the group scores so the serialized record cannot drift from them.

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::config::EngineConfig;
use crate::features::{FeatureVector, FrameSeries};

mod clarity;
mod emotion;
mod fluency;
mod pitch;
mod rhythm;

pub use clarity::ClarityMetrics;
pub use emotion::{Emotion, EmotionMetrics};
pub use fluency::FluencyMetrics;
pub use pitch::PitchMetrics;
pub use rhythm::{RhythmMetrics, StressPattern};

#[derive(Debug, Clone)]
pub struct VoiceMetrics {
    pub pitch: PitchMetrics,
    pub rhythm: RhythmMetrics,
    pub clarity: ClarityMetrics,
    pub emotion: EmotionMetrics,
    pub fluency: FluencyMetrics,
}

impl VoiceMetrics {
    /// Mean of the five group scores, recomputed on every call.
    pub fn overall_score(&self) -> f32 {
        (self.pitch.score
            + self.rhythm.score
            + self.clarity.clarity_score
            + self.emotion.score
            + self.fluency.fluency_score)
            / 5.0
    }
}

impl Serialize for VoiceMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("VoiceMetrics", 6)?;
        record.serialize_field("overall_score", &self.overall_score())?;
        record.serialize_field("pitch", &self.pitch)?;
        record.serialize_field("rhythm", &self.rhythm)?;
        record.serialize_field("clarity", &self.clarity)?;
        record.serialize_field("emotion", &self.emotion)?;
        record.serialize_field("fluency", &self.fluency)?;
        record.end()
    }
}

pub fn analyze(
    features: &FeatureVector,
    series: &FrameSeries,
    transcript_text: Option<&str>,
    word_count: Option<u32>,
    config: &EngineConfig,
) -> VoiceMetrics {
    VoiceMetrics {
        pitch: pitch::analyze(features, series),
        rhythm: rhythm::analyze(features, series, word_count),
        clarity: clarity::analyze(features),
        emotion: emotion::analyze(features),
        fluency: fluency::analyze(features, series, transcript_text, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::stats::SeriesStats;

    fn natural_features() -> FeatureVector {
        FeatureVector {
            duration_seconds: 6.0,
            sample_rate: 16_000,
            total_frames: 600,
            voiced_frames: 380,
            mfcc_mean: vec![0.0; 20],
            mfcc_std: vec![2.0; 20],
            mfcc_pooled_std: 2.0,
            centroid_hz: SeriesStats {
                mean: 1_400.0,
                std: 320.0,
                skewness: 0.2,
                kurtosis: 0.1,
                min: 600.0,
                max: 2_600.0,
            },
            rolloff_hz: SeriesStats {
                mean: 3_200.0,
                std: 700.0,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 1_500.0,
                max: 5_500.0,
            },
            bandwidth_hz: SeriesStats {
                mean: 1_600.0,
                std: 260.0,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 900.0,
                max: 2_400.0,
            },
            flatness: SeriesStats {
                mean: 0.18,
                std: 0.09,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 0.02,
                max: 0.5,
            },
            contrast_bands: [4.0, 3.5, 3.0, 2.4],
            contrast: SeriesStats {
                mean: 3.2,
                std: 0.6,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 1.5,
                max: 5.0,
            },
            tonnetz_mean: [0.1; 6],
            tonnetz_std: [0.2; 6],
            chroma_pooled_std: 0.2,
            zcr: SeriesStats {
                mean: 0.08,
                std: 0.03,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 0.01,
                max: 0.2,
            },
            energy: SeriesStats {
                mean: 0.3,
                std: 0.12,
                skewness: 0.0,
                kurtosis: 0.0,
                min: 0.0,
                max: 0.7,
            },
            pitch_hz: SeriesStats {
                mean: 170.0,
                std: 28.0,
                skewness: 0.1,
                kurtosis: 0.0,
                min: 100.0,
                max: 260.0,
            },
        }
    }

    fn natural_series() -> FrameSeries {
        let frames = 600;
        let mut pitch_hz = Vec::with_capacity(frames);
        let mut energy = Vec::with_capacity(frames);
        for i in 0..frames {
            let phase = i as f32 * 0.05;
            pitch_hz.push(170.0 + 25.0 * phase.sin());
            energy.push(0.3 + 0.1 * (phase * 0.7).sin());
        }
        FrameSeries {
            pitch_hz,
            voiced: vec![true; frames],
            energy,
            zcr: vec![0.08; frames],
            mfcc: vec![vec![0.0; 20]; frames],
            frames_per_second: 100.0,
        }
    }

    #[test]
    fn overall_score_is_mean_of_group_scores() {
        let metrics = analyze(
            &natural_features(),
            &natural_series(),
            None,
            None,
            &EngineConfig::default(),
        );
        let expected = (metrics.pitch.score
            + metrics.rhythm.score
            + metrics.clarity.clarity_score
            + metrics.emotion.score
            + metrics.fluency.fluency_score)
            / 5.0;
        assert!((metrics.overall_score() - expected).abs() < 1e-6);
    }

    #[test]
    fn serialized_record_carries_the_recomputed_overall() {
        let metrics = analyze(
            &natural_features(),
            &natural_series(),
            None,
            None,
            &EngineConfig::default(),
        );
        let json = serde_json::to_value(&metrics).unwrap();
        let overall = json["overall_score"].as_f64().unwrap() as f32;
        assert!((overall - metrics.overall_score()).abs() < 1e-6);
        assert!(json["pitch"]["score"].is_number());
        assert!(json["fluency"]["fluency_score"].is_number());
    }

    #[test]
    fn group_scores_stay_in_unit_range() {
        let metrics = analyze(
            &natural_features(),
            &natural_series(),
            Some("steady practice makes confident delivery"),
            Some(5),
            &EngineConfig::default(),
        );
        for score in [
            metrics.pitch.score,
            metrics.rhythm.score,
            metrics.clarity.clarity_score,
            metrics.emotion.score,
            metrics.fluency.fluency_score,
            metrics.overall_score(),
        ] {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }
}
