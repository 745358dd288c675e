//! Rhythm-group metrics: speech rate, pausing and stress patterning.

use serde::Serialize;

use crate::features::stats::{SeriesStats, coefficient_of_variation};
use crate::features::{FeatureVector, FrameSeries};

/// Fraction of mean frame energy below which a frame counts as silent.
const SILENCE_RATIO: f32 = 0.25;
/// Minimum run of silent frames that counts as a pause, in seconds.
const MIN_PAUSE_SECONDS: f32 = 0.2;
/// Voiced-frame fraction considered ideal for conversational pacing.
const IDEAL_VOICED_FRACTION: f32 = 0.6;

/// Categorical label for energy variation magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StressPattern {
    Monotone,
    Moderate,
    Dynamic,
}

#[derive(Debug, Clone, Serialize)]
pub struct RhythmMetrics {
    /// Voiced-frame fraction of the recording, in [0,1].
    pub speech_rate: f32,
    /// Silent-frame fraction of the recording, in [0,1].
    pub pause_ratio: f32,
    pub average_pause_seconds: f32,
    /// Inverse variance of inter-pause intervals, in [0,1].
    pub rhythm_consistency: f32,
    pub stress_pattern: StressPattern,
    /// Words per minute; requires an external word count.
    pub tempo_wpm: Option<f32>,
    pub score: f32,
}

/// Pause spans detected from the energy envelope, as (start_seconds, duration_seconds).
pub(super) fn pauses(series: &FrameSeries) -> Vec<(f32, f32)> {
    let mean_energy = SeriesStats::from_series(&series.energy).mean;
    let threshold = mean_energy * SILENCE_RATIO;
    let min_frames = (MIN_PAUSE_SECONDS * series.frames_per_second).round() as usize;
    let mut out = Vec::new();
    let mut run_start: Option<usize> = None;
    for (frame, &energy) in series.energy.iter().enumerate() {
        if energy < threshold {
            run_start.get_or_insert(frame);
        } else if let Some(start) = run_start.take() {
            push_pause(&mut out, start, frame, min_frames, series.frames_per_second);
        }
    }
    if let Some(start) = run_start {
        push_pause(
            &mut out,
            start,
            series.energy.len(),
            min_frames,
            series.frames_per_second,
        );
    }
    out
}

fn push_pause(
    out: &mut Vec<(f32, f32)>,
    start: usize,
    end: usize,
    min_frames: usize,
    fps: f32,
) {
    let frames = end - start;
    if frames >= min_frames.max(1) {
        out.push((start as f32 / fps, frames as f32 / fps));
    }
}

pub(super) fn analyze(
    features: &FeatureVector,
    series: &FrameSeries,
    word_count: Option<u32>,
) -> RhythmMetrics {
    let total = features.total_frames.max(1) as f32;
    let speech_rate = features.voiced_frames as f32 / total;

    let pause_spans = pauses(series);
    let paused_seconds: f32 = pause_spans.iter().map(|&(_, len)| len).sum();
    let pause_ratio = (paused_seconds / features.duration_seconds.max(0.1)).clamp(0.0, 1.0);
    let average_pause_seconds = if pause_spans.is_empty() {
        0.0
    } else {
        paused_seconds / pause_spans.len() as f32
    };

    let rhythm_consistency = inter_pause_consistency(&pause_spans);
    let stress_pattern = stress_from_energy(&series.energy);
    let tempo_wpm = word_count
        .map(|words| words as f32 / (features.duration_seconds / 60.0).max(1.0 / 60.0));

    let rate_adequacy = (1.0
        - (speech_rate - IDEAL_VOICED_FRACTION).abs() / IDEAL_VOICED_FRACTION)
        .clamp(0.0, 1.0);
    let score = (0.4 * rate_adequacy + 0.3 * (1.0 - pause_ratio) + 0.3 * rhythm_consistency)
        .clamp(0.0, 1.0);

    RhythmMetrics {
        speech_rate,
        pause_ratio,
        average_pause_seconds,
        rhythm_consistency,
        stress_pattern,
        tempo_wpm,
        score,
    }
}

/// Regular pausing (even inter-pause intervals) scores high; a single or no
/// pause counts as fully consistent.
fn inter_pause_consistency(pause_spans: &[(f32, f32)]) -> f32 {
    if pause_spans.len() < 3 {
        return 1.0;
    }
    let intervals: Vec<f32> = pause_spans
        .windows(2)
        .map(|pair| pair[1].0 - pair[0].0)
        .collect();
    let stats = SeriesStats::from_series(&intervals);
    1.0 / (1.0 + stats.std * stats.std)
}

fn stress_from_energy(energy: &[f32]) -> StressPattern {
    let cv = coefficient_of_variation(energy);
    if cv < 0.25 {
        StressPattern::Monotone
    } else if cv < 0.6 {
        StressPattern::Moderate
    } else {
        StressPattern::Dynamic
    }
}
