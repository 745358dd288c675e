use serde::{Deserialize, Serialize};

/// Fixed sample rate every recording is resampled to before analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 16_000;
/// STFT frame length in samples (32 ms at 16 kHz, power of two for the FFT).
pub const FRAME_SIZE: usize = 512;
/// Hop between successive frames in samples (10 ms at 16 kHz).
pub const HOP_SIZE: usize = 160;
/// Number of MFCC coefficients kept per frame.
pub const MFCC_COUNT: usize = 20;
/// Mel filterbank resolution feeding the MFCC DCT.
pub const MEL_BANDS: usize = 40;
/// Tonnetz descriptor dimension.
pub const TONNETZ_DIMS: usize = 6;
/// Spectral contrast band count.
pub const CONTRAST_BANDS: usize = 4;

/// Ensemble weights for the three AI-detection methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionWeights {
    pub heuristic: f32,
    pub pattern: f32,
    pub temporal: f32,
}

impl DetectionWeights {
    pub fn sum(&self) -> f32 {
        self.heuristic + self.pattern + self.temporal
    }

    /// Weights used when the recording is too short for temporal scoring:
    /// the temporal share is split proportionally between the other two.
    pub fn without_temporal(&self) -> Self {
        let remaining = self.heuristic + self.pattern;
        if remaining <= 0.0 {
            return Self { heuristic: 0.5, pattern: 0.5, temporal: 0.0 };
        }
        Self {
            heuristic: self.heuristic / remaining,
            pattern: self.pattern / remaining,
            temporal: 0.0,
        }
    }
}

impl Default for DetectionWeights {
    fn default() -> Self {
        Self { heuristic: 0.50, pattern: 0.30, temporal: 0.20 }
    }
}

/// Every tunable the engine exposes. Constructed once by the caller and
/// injected into [`crate::engine::AnalysisEngine`]; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum recording duration accepted for analysis, in seconds.
    pub min_duration_seconds: f32,
    /// Maximum recording duration accepted for analysis, in seconds.
    pub max_duration_seconds: f32,
    /// Peak level (dBFS) below which the whole recording counts as silent.
    pub silence_floor_dbfs: f32,
    /// Target peak after normalization.
    pub normalize_peak: f32,
    /// High-pass cutoff suppressing sub-vocal rumble, in Hz.
    pub highpass_cutoff_hz: f32,
    /// Minimum number of voiced frames required to analyze at all.
    pub min_voiced_frames: usize,
    /// Detection ensemble weights (must sum to 1.0).
    pub detection_weights: DetectionWeights,
    /// Confidence above which a recording is classified as AI-generated.
    pub ai_threshold: f32,
    /// Confidence above which the risk tier is `high`.
    pub high_risk_threshold: f32,
    /// Segment length for temporal-consistency scoring, in seconds.
    pub temporal_segment_seconds: f32,
    /// Maximum number of segments examined by the temporal method.
    pub temporal_max_segments: usize,
    /// Script-detection confidence required to override the acoustic
    /// language result on disagreement.
    pub script_override_confidence: f32,
    /// Confidence assigned when a native (non-Latin) script dominates.
    pub native_script_confidence: f32,
    /// Pause longer than this counts as a hesitation, in seconds.
    pub hesitation_pause_seconds: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_duration_seconds: 0.5,
            max_duration_seconds: 900.0,
            silence_floor_dbfs: -60.0,
            normalize_peak: 0.95,
            highpass_cutoff_hz: 70.0,
            min_voiced_frames: 10,
            detection_weights: DetectionWeights::default(),
            ai_threshold: 0.65,
            high_risk_threshold: 0.80,
            temporal_segment_seconds: 2.0,
            temporal_max_segments: 5,
            script_override_confidence: 0.85,
            native_script_confidence: 0.90,
            hesitation_pause_seconds: 0.8,
        }
    }
}
