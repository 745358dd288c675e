//! Language identification from acoustics and, when available, transcript
//! script analysis.
//!
//! The acoustic method always runs. A transcript adds script detection;
//! the two are merged with a fixed policy: agreement boosts confidence,
//! a confident script overrides, anything else stays acoustic.

mod acoustic;
mod script;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::features::FeatureVector;

use script::ScriptDetection;

/// Languages the identifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Kn,
    Te,
    Ta,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Kn => "kn",
            Language::Te => "te",
            Language::Ta => "ta",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Kn => "Kannada",
            Language::Te => "Telugu",
            Language::Ta => "Tamil",
        }
    }
}

/// How the reported language was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Acoustic scoring only.
    Feature,
    /// Transcript script overrode the acoustic result.
    Transcription,
    /// Acoustic and script methods agreed.
    Merged,
}

/// Acoustic statistics the decision was based on, kept for the record.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionFeatures {
    pub spectral_centroid_hz: f32,
    pub spectral_rolloff_hz: f32,
    pub spectral_bandwidth_hz: f32,
    pub zero_crossing_rate: f32,
    pub mfcc_std: f32,
    pub language_scores: BTreeMap<&'static str, u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageResult {
    pub language: Language,
    pub language_name: &'static str,
    pub confidence: f32,
    pub method: DetectionMethod,
    pub detection_features: DetectionFeatures,
}

const AGREEMENT_BOOST: f32 = 0.05;
const CONFIDENCE_CAP: f32 = 0.98;

/// Identify the spoken language from features plus an optional transcript.
pub fn identify(
    features: &FeatureVector,
    transcript_text: Option<&str>,
    config: &EngineConfig,
) -> LanguageResult {
    let outcome = acoustic::identify(features);
    let detection_features = snapshot(features, &outcome);

    let script_hit = transcript_text.map(script::detect);
    let (language, confidence, method) = match script_hit {
        Some(ScriptDetection::Native(script_language)) => {
            let script_confidence = config.native_script_confidence;
            if script_language == outcome.language {
                let merged =
                    (outcome.confidence.max(script_confidence) + AGREEMENT_BOOST).min(CONFIDENCE_CAP);
                (script_language, merged, DetectionMethod::Merged)
            } else if script_confidence >= config.script_override_confidence {
                (script_language, script_confidence, DetectionMethod::Transcription)
            } else {
                (outcome.language, outcome.confidence, DetectionMethod::Feature)
            }
        }
        Some(ScriptDetection::Unsupported) | Some(ScriptDetection::None) | None => {
            (outcome.language, outcome.confidence, DetectionMethod::Feature)
        }
    };

    debug!(
        language = language.code(),
        confidence,
        method = ?method,
        "language identified"
    );

    LanguageResult {
        language,
        language_name: language.name(),
        confidence,
        method,
        detection_features,
    }
}

fn snapshot(features: &FeatureVector, outcome: &acoustic::AcousticOutcome) -> DetectionFeatures {
    DetectionFeatures {
        spectral_centroid_hz: features.centroid_hz.mean,
        spectral_rolloff_hz: features.rolloff_hz.mean,
        spectral_bandwidth_hz: features.bandwidth_hz.mean,
        zero_crossing_rate: features.zcr.mean,
        mfcc_std: features.mfcc_pooled_std,
        language_scores: outcome
            .scores
            .iter()
            .map(|&(language, score)| (language.code(), score))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::stats::SeriesStats;

    fn english_features() -> FeatureVector {
        let mut f = FeatureVector::zeroed_for_tests();
        f.centroid_hz = SeriesStats { mean: 2_600.0, ..SeriesStats::zero() };
        f.rolloff_hz = SeriesStats { mean: 5_000.0, ..SeriesStats::zero() };
        f.bandwidth_hz = SeriesStats { mean: 1_900.0, ..SeriesStats::zero() };
        f.zcr = SeriesStats { mean: 0.16, ..SeriesStats::zero() };
        f.mfcc_pooled_std = 2.8;
        f
    }

    #[test]
    fn no_transcript_stays_feature_based() {
        let result = identify(&english_features(), None, &EngineConfig::default());
        assert_eq!(result.language, Language::En);
        assert_eq!(result.method, DetectionMethod::Feature);
        assert_eq!(result.language_name, "English");
    }

    #[test]
    fn native_script_overrides_a_disagreeing_acoustic_result() {
        let result = identify(
            &english_features(),
            Some("नमस्ते आप कैसे हैं"),
            &EngineConfig::default(),
        );
        assert_eq!(result.language, Language::Hi);
        assert_eq!(result.method, DetectionMethod::Transcription);
        assert!((result.confidence - 0.90).abs() < 1e-6);
    }

    #[test]
    fn agreement_merges_with_a_capped_boost() {
        // Kannada-band acoustics plus a Kannada transcript.
        let mut f = FeatureVector::zeroed_for_tests();
        f.centroid_hz = SeriesStats { mean: 1_150.0, ..SeriesStats::zero() };
        f.rolloff_hz = SeriesStats { mean: 1_900.0, ..SeriesStats::zero() };
        f.bandwidth_hz = SeriesStats { mean: 1_000.0, ..SeriesStats::zero() };
        f.zcr = SeriesStats { mean: 0.03, ..SeriesStats::zero() };
        f.mfcc_pooled_std = 1.2;
        let result = identify(&f, Some("ನಮಸ್ಕಾರ ಹೇಗಿದ್ದೀರಾ"), &EngineConfig::default());
        assert_eq!(result.language, Language::Kn);
        assert_eq!(result.method, DetectionMethod::Merged);
        assert!((result.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn unsupported_script_falls_back_to_acoustics() {
        let result = identify(
            &english_features(),
            Some("こんにちは皆さん"),
            &EngineConfig::default(),
        );
        assert_eq!(result.language, Language::En);
        assert_eq!(result.method, DetectionMethod::Feature);
    }

    #[test]
    fn snapshot_carries_every_language_score() {
        let result = identify(&english_features(), None, &EngineConfig::default());
        assert_eq!(result.detection_features.language_scores.len(), 4);
        assert!(result.detection_features.language_scores.contains_key("en"));
    }
}
