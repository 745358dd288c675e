//! Spoken-audio analysis engine: voice quality scoring, AI-voice
//! detection and language identification over one shared feature pass.
//!
//! The pipeline is [`engine::AnalysisEngine::analyze`]: preprocess a raw
//! waveform, extract features once, then run the three analyzers and
//! merge their outputs into an [`engine::AnalysisRecord`].

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod features;
pub mod language;
pub mod logging;
pub mod preprocess;
pub mod quality;

pub use config::EngineConfig;
pub use engine::{AnalysisEngine, AnalysisInput, AnalysisRecord, Transcriber, Transcript};
pub use error::{AnalysisError, InvalidAudio, TranscribeError};
