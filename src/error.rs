use thiserror::Error;

/// Why a waveform was rejected before any feature work started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidAudio {
    #[error("waveform is empty")]
    Empty,
    #[error("waveform is silent (peak below the silence floor)")]
    Silent,
    #[error("recording shorter than the minimum analysis window")]
    TooShort,
    #[error("recording exceeds the maximum supported duration")]
    TooLong,
}

/// Fatal analysis failures surfaced to the caller. Non-fatal degradations
/// (missing transcript, too few temporal segments) never take this path;
/// they are recorded on the output record instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid audio: {0}")]
    InvalidAudio(#[from] InvalidAudio),
    #[error("insufficient voiced content: {found} voiced frames, need at least {required}")]
    InsufficientVoicedFrames { found: usize, required: usize },
}

/// Failure reported by an external transcription collaborator.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription timed out after {seconds:.1}s")]
    Timeout { seconds: f32 },
    #[error("transcription unavailable: {message}")]
    Unavailable { message: String },
}
