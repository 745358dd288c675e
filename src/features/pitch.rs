//! Per-frame fundamental-frequency estimation via autocorrelation.

use crate::config::{FRAME_SIZE, HOP_SIZE};

/// Search range for speech fundamentals, in Hz.
const PITCH_MIN_HZ: f32 = 60.0;
const PITCH_MAX_HZ: f32 = 400.0;
/// Normalized autocorrelation peak required to call a frame voiced.
const VOICING_THRESHOLD: f32 = 0.45;
/// Frame RMS below this is treated as silence regardless of periodicity.
const ENERGY_GATE: f32 = 0.01;

/// Pitch contour for a recording. Unvoiced frames report 0 Hz.
#[derive(Debug, Clone)]
pub(crate) struct PitchTrack {
    pub(crate) pitch_hz: Vec<f32>,
    pub(crate) voiced: Vec<bool>,
}

impl PitchTrack {
    pub(crate) fn voiced_count(&self) -> usize {
        self.voiced.iter().filter(|&&v| v).count()
    }

    /// Pitch values for voiced frames only, in frame order.
    pub(crate) fn voiced_values(&self) -> Vec<f32> {
        self.pitch_hz
            .iter()
            .zip(&self.voiced)
            .filter_map(|(&hz, &voiced)| voiced.then_some(hz))
            .collect()
    }
}

/// Track pitch over the same frame grid the spectral analyzer uses.
pub(crate) fn track_pitch(samples: &[f32], sample_rate: u32) -> PitchTrack {
    let frame_count = if samples.len() >= FRAME_SIZE {
        1 + (samples.len() - FRAME_SIZE) / HOP_SIZE
    } else {
        1
    };
    let min_lag = ((sample_rate as f32 / PITCH_MAX_HZ).floor() as usize).max(2);
    let max_lag = ((sample_rate as f32 / PITCH_MIN_HZ).ceil() as usize).min(FRAME_SIZE - 1);
    let mut pitch_hz = Vec::with_capacity(frame_count);
    let mut voiced = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let start = frame * HOP_SIZE;
        let end = (start + FRAME_SIZE).min(samples.len());
        let window = &samples[start.min(samples.len())..end];
        let estimate = estimate_frame(window, sample_rate, min_lag, max_lag);
        match estimate {
            Some(hz) => {
                pitch_hz.push(hz);
                voiced.push(true);
            }
            None => {
                pitch_hz.push(0.0);
                voiced.push(false);
            }
        }
    }
    PitchTrack { pitch_hz, voiced }
}

fn estimate_frame(
    window: &[f32],
    sample_rate: u32,
    min_lag: usize,
    max_lag: usize,
) -> Option<f32> {
    if window.len() <= max_lag || min_lag >= max_lag {
        return None;
    }
    let energy: f64 = window.iter().map(|&v| (v as f64) * (v as f64)).sum();
    let rms = (energy / window.len() as f64).sqrt() as f32;
    if rms < ENERGY_GATE {
        return None;
    }
    let mut best_lag = 0usize;
    let mut best_value = 0.0_f64;
    for lag in min_lag..=max_lag {
        let mut sum = 0.0_f64;
        for i in 0..window.len() - lag {
            sum += window[i] as f64 * window[i + lag] as f64;
        }
        if sum > best_value {
            best_value = sum;
            best_lag = lag;
        }
    }
    if best_lag == 0 || energy <= 0.0 {
        return None;
    }
    let normalized = (best_value / energy) as f32;
    if normalized < VOICING_THRESHOLD {
        return None;
    }
    // Parabolic interpolation around the peak lag for sub-sample precision.
    let refined = refine_lag(window, best_lag, min_lag, max_lag);
    Some(sample_rate as f32 / refined)
}

fn autocorr_at(window: &[f32], lag: usize) -> f64 {
    if lag >= window.len() {
        return 0.0;
    }
    (0..window.len() - lag)
        .map(|i| window[i] as f64 * window[i + lag] as f64)
        .sum()
}

fn refine_lag(window: &[f32], lag: usize, min_lag: usize, max_lag: usize) -> f32 {
    if lag <= min_lag || lag >= max_lag {
        return lag as f32;
    }
    let left = autocorr_at(window, lag - 1);
    let center = autocorr_at(window, lag);
    let right = autocorr_at(window, lag + 1);
    let denom = left - 2.0 * center + right;
    if denom.abs() < 1e-12 {
        return lag as f32;
    }
    let shift = (0.5 * (left - right) / denom).clamp(-0.5, 0.5);
    lag as f32 + shift as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS_SAMPLE_RATE;

    fn sine(freq: f32, seconds: f32, amplitude: f32) -> Vec<f32> {
        let sr = ANALYSIS_SAMPLE_RATE as f32;
        (0..(seconds * sr) as usize)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sr).sin())
            .collect()
    }

    #[test]
    fn tracks_a_steady_fundamental() {
        let track = track_pitch(&sine(150.0, 0.5, 0.8), ANALYSIS_SAMPLE_RATE);
        assert!(track.voiced_count() > track.pitch_hz.len() / 2);
        let voiced = track.voiced_values();
        let mean = voiced.iter().sum::<f32>() / voiced.len() as f32;
        assert!((mean - 150.0).abs() < 8.0, "tracked {mean} Hz");
    }

    #[test]
    fn silence_is_unvoiced() {
        let track = track_pitch(&vec![0.0_f32; 8_000], ANALYSIS_SAMPLE_RATE);
        assert_eq!(track.voiced_count(), 0);
        assert!(track.pitch_hz.iter().all(|&hz| hz == 0.0));
    }

    #[test]
    fn aperiodic_noise_is_mostly_unvoiced() {
        let mut state = 0x9e37_79b9_u32;
        let noise: Vec<f32> = (0..4_800)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                0.8 * ((state >> 16) as f32 / 32_768.0 - 1.0)
            })
            .collect();
        let track = track_pitch(&noise, ANALYSIS_SAMPLE_RATE);
        let voiced_fraction = track.voiced_count() as f32 / track.pitch_hz.len() as f32;
        assert!(voiced_fraction < 0.3, "voiced fraction {voiced_fraction}");
    }
}
