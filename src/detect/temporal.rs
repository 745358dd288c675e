//! Cross-segment similarity analysis.
//!
//! The recording is cut into fixed-length segments; each segment is reduced
//! to its mean MFCC vector and successive segments are compared with Pearson
//! correlation. Human speech drifts enough across seconds that successive
//! segments rarely correlate as strongly as synthetic speech does.

use crate::config::EngineConfig;
use crate::features::FrameSeries;
use crate::features::stats::pearson_correlation;

/// Average successive-segment similarity bands (value above threshold fires).
const SIMILARITY_BANDS: &[(f32, f32)] = &[(0.95, 0.9), (0.90, 0.7), (0.85, 0.5), (0.80, 0.3)];

pub(super) enum TemporalOutcome {
    Scored(f32),
    /// Fewer than two full segments; the ensemble redistributes this weight.
    TooShort,
}

pub(super) fn score(series: &FrameSeries, config: &EngineConfig) -> TemporalOutcome {
    let frames_per_segment =
        (config.temporal_segment_seconds * series.frames_per_second).round() as usize;
    if frames_per_segment == 0 || series.mfcc.len() < frames_per_segment * 2 {
        return TemporalOutcome::TooShort;
    }
    let segment_count = (series.mfcc.len() / frames_per_segment).min(config.temporal_max_segments);
    let mut segment_means = Vec::with_capacity(segment_count);
    for segment in 0..segment_count {
        let start = segment * frames_per_segment;
        let frames = &series.mfcc[start..start + frames_per_segment];
        segment_means.push(mean_vector(frames));
    }

    let similarities: Vec<f32> = segment_means
        .windows(2)
        .map(|pair| pearson_correlation(&pair[0], &pair[1]))
        .collect();
    let average = similarities.iter().sum::<f32>() / similarities.len() as f32;

    for &(threshold, weight) in SIMILARITY_BANDS {
        if average > threshold {
            return TemporalOutcome::Scored(weight.min(1.0));
        }
    }
    TemporalOutcome::Scored(0.0)
}

fn mean_vector(frames: &[Vec<f32>]) -> Vec<f32> {
    let width = frames.first().map(Vec::len).unwrap_or(0);
    let mut out = vec![0.0_f32; width];
    for frame in frames {
        for (sum, &value) in out.iter_mut().zip(frame) {
            *sum += value;
        }
    }
    for value in &mut out {
        *value /= frames.len().max(1) as f32;
    }
    out
}
