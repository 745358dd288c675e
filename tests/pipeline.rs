//! End-to-end pipeline tests over synthetic waveforms.

use vociq::config::ANALYSIS_SAMPLE_RATE;
use vociq::engine::{AnalysisEngine, AnalysisInput, Transcript};
use vociq::{AnalysisError, EngineConfig, InvalidAudio};

const PI2: f32 = 2.0 * std::f32::consts::PI;

/// Perfectly steady harmonic tone, the signature of synthesized speech.
fn steady_tone(seconds: f32) -> Vec<f32> {
    let n = (seconds * ANALYSIS_SAMPLE_RATE as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / ANALYSIS_SAMPLE_RATE as f32;
            0.4 * (PI2 * 150.0 * t).sin()
                + 0.2 * (PI2 * 300.0 * t).sin()
                + 0.1 * (PI2 * 600.0 * t).sin()
        })
        .collect()
}

/// Same harmonic stack with slow vibrato and amplitude movement, closer
/// to a natural delivery.
fn modulated_tone(seconds: f32) -> Vec<f32> {
    modulated_tone_at(seconds, ANALYSIS_SAMPLE_RATE)
}

fn modulated_tone_at(seconds: f32, rate: u32) -> Vec<f32> {
    let n = (seconds * rate as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / rate as f32;
            let vibrato = 1.0 + 0.03 * (PI2 * 5.0 * t).sin();
            let tremolo = 0.7 + 0.3 * (PI2 * 0.8 * t).sin();
            tremolo
                * (0.4 * (PI2 * 150.0 * vibrato * t).sin()
                    + 0.2 * (PI2 * 300.0 * vibrato * t).sin())
        })
        .collect()
}

fn engine() -> AnalysisEngine {
    AnalysisEngine::new(EngineConfig::default())
}

#[test]
fn steady_synthetic_tone_is_flagged_as_ai() {
    let record = engine()
        .analyze(AnalysisInput::new(steady_tone(10.0), ANALYSIS_SAMPLE_RATE))
        .expect("analysis succeeds");
    assert!(record.detection.is_ai_generated);
    assert!(!record.detection.indicators.is_empty());
}

#[test]
fn detection_invariants_hold_for_any_input() {
    for samples in [steady_tone(10.0), modulated_tone(10.0)] {
        let record = engine()
            .analyze(AnalysisInput::new(samples, ANALYSIS_SAMPLE_RATE))
            .expect("analysis succeeds");
        let d = &record.detection;
        assert!((d.weights.sum() - 1.0).abs() < 1e-6);
        for score in [d.heuristic_score, d.pattern_score, d.temporal_score, d.confidence] {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
        let weighted = d.heuristic_score * d.weights.heuristic
            + d.pattern_score * d.weights.pattern
            + d.temporal_score * d.weights.temporal;
        assert!((d.confidence - weighted).abs() < 1e-6);
    }
}

#[test]
fn short_recording_redistributes_the_temporal_weight() {
    let record = engine()
        .analyze(AnalysisInput::new(steady_tone(3.0), ANALYSIS_SAMPLE_RATE))
        .expect("analysis succeeds");
    assert!(record.detection.temporal_degraded);
    assert_eq!(record.detection.temporal_score, 0.0);
    assert_eq!(record.detection.weights.temporal, 0.0);
    assert!((record.detection.weights.sum() - 1.0).abs() < 1e-6);
}

#[test]
fn silent_input_is_rejected() {
    let silence = vec![0.0_f32; ANALYSIS_SAMPLE_RATE as usize * 4];
    let result = engine().analyze(AnalysisInput::new(silence, ANALYSIS_SAMPLE_RATE));
    assert!(matches!(
        result,
        Err(AnalysisError::InvalidAudio(InvalidAudio::Silent))
    ));
}

#[test]
fn devanagari_transcript_drives_the_language_result() {
    let mut input = AnalysisInput::new(modulated_tone(8.0), ANALYSIS_SAMPLE_RATE);
    input.transcript = Some(Transcript::from_text("नमस्ते आज हम अभ्यास करेंगे", 0.9));
    let record = engine().analyze(input).expect("analysis succeeds");
    assert_eq!(record.language.language.code(), "hi");
    assert!(record.language.confidence >= 0.85);
    assert!(matches!(
        record.language.method,
        vociq::language::DetectionMethod::Transcription | vociq::language::DetectionMethod::Merged
    ));
}

#[test]
fn analysis_is_idempotent() {
    let samples = modulated_tone(8.0);
    let first = engine()
        .analyze(AnalysisInput::new(samples.clone(), ANALYSIS_SAMPLE_RATE))
        .expect("first run");
    let second = engine()
        .analyze(AnalysisInput::new(samples, ANALYSIS_SAMPLE_RATE))
        .expect("second run");
    let a = serde_json::to_string(&first).expect("serialize first");
    let b = serde_json::to_string(&second).expect("serialize second");
    assert_eq!(a, b);
}

#[test]
fn serialized_overall_score_matches_the_group_mean() {
    let record = engine()
        .analyze(AnalysisInput::new(modulated_tone(8.0), ANALYSIS_SAMPLE_RATE))
        .expect("analysis succeeds");
    let json = serde_json::to_value(&record).expect("serialize record");
    let metrics = &json["audio_metrics"];
    let groups = [
        metrics["pitch"]["score"].as_f64().unwrap(),
        metrics["rhythm"]["score"].as_f64().unwrap(),
        metrics["clarity"]["clarity_score"].as_f64().unwrap(),
        metrics["emotion"]["score"].as_f64().unwrap(),
        metrics["fluency"]["fluency_score"].as_f64().unwrap(),
    ];
    let mean = groups.iter().sum::<f64>() / groups.len() as f64;
    let overall = metrics["overall_score"].as_f64().unwrap();
    assert!((overall - mean).abs() < 1e-5);
}

#[test]
fn metadata_reflects_the_source_recording() {
    let record = engine()
        .analyze(AnalysisInput::new(modulated_tone_at(8.0, 48_000), 48_000))
        .expect("analysis succeeds");
    assert_eq!(record.metadata.source_sample_rate, 48_000);
    assert_eq!(record.metadata.analysis_sample_rate, ANALYSIS_SAMPLE_RATE);
    assert!(record.metadata.duration_seconds > 0.0);
    assert!(!record.metadata.engine_version.is_empty());
}
