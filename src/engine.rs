//! Pipeline orchestration: preprocess, extract, then fan out to the
//! detection, quality and language analyzers and merge one record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::detect::{self, DetectionResult};
use crate::error::{AnalysisError, TranscribeError};
use crate::features;
use crate::language::{self, LanguageResult};
use crate::preprocess;
use crate::quality::{self, VoiceMetrics};

/// Version stamped into every record's metadata.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// External speech-to-text collaborator. The engine works without one;
/// transcript-dependent metrics degrade with explicit markers instead.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcript, TranscribeError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub text: String,
    pub word_count: u32,
    pub confidence: f32,
}

impl Transcript {
    pub fn from_text(text: impl Into<String>, confidence: f32) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count() as u32;
        Self { text, word_count, confidence }
    }
}

/// One recording to analyze, with optional caller-supplied context.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Caller-provided transcript; takes precedence over the transcriber.
    pub transcript: Option<Transcript>,
    pub session_type: Option<String>,
    pub topic: Option<String>,
}

impl AnalysisInput {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            transcript: None,
            session_type: None,
            topic: None,
        }
    }
}

/// Non-fatal shortfalls recorded on the output instead of failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// No transcript was supplied and the transcriber was absent or failed.
    TranscriptionUnavailable,
    /// Recording too short for temporal consistency scoring; its weight
    /// was redistributed.
    TemporalWindowTooShort,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordMetadata {
    pub duration_seconds: f32,
    pub source_duration_seconds: f32,
    pub source_sample_rate: u32,
    pub analysis_sample_rate: u32,
    pub session_type: Option<String>,
    pub topic: Option<String>,
    pub engine_version: &'static str,
    pub degradations: Vec<Degradation>,
}

/// Complete analysis output. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub audio_metrics: VoiceMetrics,
    pub detection: DetectionResult,
    pub language: LanguageResult,
    pub transcription: Option<String>,
    pub metadata: RecordMetadata,
}

/// The analysis pipeline. Holds only immutable configuration and an
/// optional transcriber, so one engine can serve concurrent callers.
pub struct AnalysisEngine {
    config: EngineConfig,
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, transcriber: None }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline on one recording.
    pub fn analyze(&self, input: AnalysisInput) -> Result<AnalysisRecord, AnalysisError> {
        let clean = preprocess::preprocess(&input.samples, input.sample_rate, &self.config)?;
        debug!(
            duration = clean.duration_seconds,
            source_rate = clean.source_sample_rate,
            "audio preprocessed"
        );

        let (features, series) = features::extract(&clean, &self.config)?;

        let mut degradations = Vec::new();
        let transcript = self.resolve_transcript(&input, &clean, &mut degradations);
        let transcript_text = transcript.as_ref().map(|t| t.text.as_str());
        let word_count = transcript.as_ref().map(|t| t.word_count);

        let detection = detect::detect(&features, &series, &self.config);
        if detection.temporal_degraded {
            degradations.push(Degradation::TemporalWindowTooShort);
        }

        let audio_metrics =
            quality::analyze(&features, &series, transcript_text, word_count, &self.config);
        let language = language::identify(&features, transcript_text, &self.config);

        info!(
            duration = clean.duration_seconds,
            ai_confidence = detection.confidence,
            overall_score = audio_metrics.overall_score(),
            language = language.language.code(),
            "analysis complete"
        );

        Ok(AnalysisRecord {
            audio_metrics,
            detection,
            language,
            transcription: transcript.map(|t| t.text),
            metadata: RecordMetadata {
                duration_seconds: clean.duration_seconds,
                source_duration_seconds: clean.source_duration_seconds,
                source_sample_rate: clean.source_sample_rate,
                analysis_sample_rate: clean.sample_rate,
                session_type: input.session_type,
                topic: input.topic,
                engine_version: ENGINE_VERSION,
                degradations,
            },
        })
    }

    fn resolve_transcript(
        &self,
        input: &AnalysisInput,
        clean: &preprocess::CleanAudio,
        degradations: &mut Vec<Degradation>,
    ) -> Option<Transcript> {
        if let Some(transcript) = &input.transcript {
            return Some(transcript.clone());
        }
        match &self.transcriber {
            Some(transcriber) => {
                match transcriber.transcribe(&clean.samples, clean.sample_rate) {
                    Ok(transcript) => Some(transcript),
                    Err(error) => {
                        warn!(%error, "transcription failed, continuing without");
                        degradations.push(Degradation::TranscriptionUnavailable);
                        None
                    }
                }
            }
            None => {
                degradations.push(Degradation::TranscriptionUnavailable);
                None
            }
        }
    }
}
