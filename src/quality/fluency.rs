//! Fluency-group metrics: hesitation, repetition and delivery smoothness.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::features::stats::{SeriesStats, successive_difference_variance};
use crate::features::{FeatureVector, FrameSeries};

use super::rhythm;

/// Long pauses per minute that zero out the hesitation sub-score.
const HESITATIONS_FULL_SCALE: f32 = 6.0;
/// Mean relative frame-to-frame pitch change above which jitter is flagged.
const JITTER_ISSUE_THRESHOLD: f32 = 0.04;
/// Adjacent-word repetition rate above which repetition is flagged.
const REPETITION_ISSUE_THRESHOLD: f32 = 0.05;
/// Hesitation sub-score below which frequent pauses are flagged.
const PAUSE_ISSUE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct FluencyMetrics {
    pub fluency_score: f32,
    /// Long pauses per minute.
    pub hesitation_rate: f32,
    /// 1.0 minus the adjacent-word repetition rate; requires a transcript.
    pub repetition_score: Option<f32>,
    pub smoothness: f32,
    pub issues: Vec<String>,
}

pub(super) fn analyze(
    features: &FeatureVector,
    series: &FrameSeries,
    transcript_text: Option<&str>,
    config: &EngineConfig,
) -> FluencyMetrics {
    let minutes = (features.duration_seconds / 60.0).max(1.0 / 60.0);
    let long_pauses = rhythm::pauses(series)
        .iter()
        .filter(|&&(_, len)| len > config.hesitation_pause_seconds)
        .count();
    let hesitation_rate = long_pauses as f32 / minutes;
    let hesitation_score = (1.0 - hesitation_rate / HESITATIONS_FULL_SCALE).clamp(0.0, 1.0);

    let jitter = pitch_jitter(series);
    let energy_smoothness = energy_smoothness(&series.energy);
    let smoothness =
        (0.5 * (1.0 - (jitter / JITTER_ISSUE_THRESHOLD).min(1.0)) + 0.5 * energy_smoothness)
            .clamp(0.0, 1.0);

    let repetition_rate = transcript_text.map(adjacent_repetition_rate);
    let repetition_score = repetition_rate.map(|rate| (1.0 - rate * 4.0).clamp(0.0, 1.0));

    let mut issues = Vec::new();
    if hesitation_score < PAUSE_ISSUE_THRESHOLD {
        issues.push("frequent pauses".to_string());
    }
    if jitter > JITTER_ISSUE_THRESHOLD {
        issues.push("high pitch jitter".to_string());
    }
    if energy_smoothness < 0.4 {
        issues.push("uneven loudness".to_string());
    }
    if let Some(rate) = repetition_rate
        && rate > REPETITION_ISSUE_THRESHOLD
    {
        issues.push("frequent word repetition".to_string());
    }

    // The repetition term only participates when a transcript exists.
    let fluency_score = match repetition_score {
        Some(repetition) => {
            (0.4 * hesitation_score + 0.35 * smoothness + 0.25 * repetition).clamp(0.0, 1.0)
        }
        None => (0.5 * hesitation_score + 0.5 * smoothness).clamp(0.0, 1.0),
    };

    FluencyMetrics {
        fluency_score,
        hesitation_rate,
        repetition_score,
        smoothness,
        issues,
    }
}

/// Mean absolute relative change between successive voiced pitch values.
fn pitch_jitter(series: &FrameSeries) -> f32 {
    let voiced = series.voiced_pitch();
    if voiced.len() < 2 {
        return 0.0;
    }
    let mean = SeriesStats::from_series(&voiced).mean;
    if mean <= 0.0 {
        return 0.0;
    }
    let total: f32 = voiced.windows(2).map(|pair| (pair[1] - pair[0]).abs()).sum();
    total / (voiced.len() - 1) as f32 / mean
}

fn energy_smoothness(energy: &[f32]) -> f32 {
    let stats = SeriesStats::from_series(energy);
    if stats.mean <= 0.0 {
        return 1.0;
    }
    let diff_var = successive_difference_variance(energy);
    let relative = diff_var.sqrt() / stats.mean;
    (1.0 - relative).clamp(0.0, 1.0)
}

fn adjacent_repetition_rate(text: &str) -> f32 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < 2 {
        return 0.0;
    }
    let repeats = words.windows(2).filter(|pair| pair[0] == pair[1]).count();
    repeats as f32 / (words.len() - 1) as f32
}
