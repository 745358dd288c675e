//! Waveform cleanup ahead of feature extraction.
//!
//! The preprocessor validates the raw recording, resamples it once to the
//! fixed analysis rate, then applies DC-offset removal, a gentle high-pass,
//! noise-floor reduction and peak normalization, in that order. Duration
//! (at the analysis rate) and channel layout are otherwise preserved.

use tracing::debug;

use crate::config::{ANALYSIS_SAMPLE_RATE, EngineConfig};
use crate::error::InvalidAudio;

/// Cleaned mono audio at the fixed analysis rate.
#[derive(Debug, Clone)]
pub struct CleanAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_seconds: f32,
    /// Duration of the recording as submitted, before resampling.
    pub source_duration_seconds: f32,
    pub source_sample_rate: u32,
}

/// Validate and clean a raw decoded waveform.
pub fn preprocess(
    samples: &[f32],
    sample_rate: u32,
    config: &EngineConfig,
) -> Result<CleanAudio, InvalidAudio> {
    if samples.is_empty() || sample_rate == 0 {
        return Err(InvalidAudio::Empty);
    }
    let source_duration = samples.len() as f32 / sample_rate as f32;
    if source_duration < config.min_duration_seconds {
        return Err(InvalidAudio::TooShort);
    }
    if source_duration > config.max_duration_seconds {
        return Err(InvalidAudio::TooLong);
    }
    let peak = peak(samples);
    if peak < db_to_linear(config.silence_floor_dbfs) {
        return Err(InvalidAudio::Silent);
    }

    let mut mono = resample_linear(samples, sample_rate, ANALYSIS_SAMPLE_RATE);
    remove_dc_offset(&mut mono);
    highpass_in_place(&mut mono, ANALYSIS_SAMPLE_RATE, config.highpass_cutoff_hz);
    reduce_noise_floor(&mut mono, ANALYSIS_SAMPLE_RATE);
    normalize_peak_in_place(&mut mono, config.normalize_peak);

    let duration_seconds = mono.len() as f32 / ANALYSIS_SAMPLE_RATE as f32;
    debug!(
        source_rate = sample_rate,
        analysis_rate = ANALYSIS_SAMPLE_RATE,
        duration_seconds,
        "preprocessed recording"
    );
    Ok(CleanAudio {
        samples: mono,
        sample_rate: ANALYSIS_SAMPLE_RATE,
        duration_seconds,
        source_duration_seconds: source_duration,
        source_sample_rate: sample_rate,
    })
}

pub(crate) fn sanitize_sample(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .copied()
        .map(|v| sanitize_sample(v).abs())
        .fold(0.0_f32, f32::max)
}

fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Resample with linear interpolation. Deterministic; identity when the
/// rates already match.
pub(crate) fn resample_linear(samples: &[f32], input_rate: u32, output_rate: u32) -> Vec<f32> {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    if samples.is_empty() || input_rate == output_rate {
        return samples.iter().copied().map(sanitize_sample).collect();
    }
    let duration = samples.len() as f64 / input_rate as f64;
    let out_len = (duration * output_rate as f64).round().max(1.0) as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * input_rate as f64 / output_rate as f64;
        let left = pos.floor() as usize;
        let frac = (pos - left as f64) as f32;
        let a = sanitize_sample(samples.get(left).copied().unwrap_or(0.0));
        let b = sanitize_sample(samples.get(left + 1).copied().unwrap_or(a));
        out.push(a + (b - a) * frac);
    }
    out
}

fn remove_dc_offset(samples: &mut [f32]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().copied().map(|v| v as f64).sum::<f64>() / samples.len() as f64;
    let mean = mean as f32;
    for sample in samples {
        *sample -= mean;
    }
}

/// One-pole high-pass removing sub-vocal rumble below `cutoff_hz`.
fn highpass_in_place(samples: &mut [f32], sample_rate: u32, cutoff_hz: f32) {
    if samples.is_empty() || cutoff_hz <= 0.0 {
        return;
    }
    let dt = 1.0 / sample_rate.max(1) as f32;
    let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
    let alpha = rc / (rc + dt);
    let mut prev_in = samples[0];
    let mut prev_out = samples[0];
    for sample in samples.iter_mut().skip(1) {
        let input = *sample;
        let output = alpha * (prev_out + input - prev_in);
        prev_in = input;
        prev_out = output;
        *sample = output;
    }
}

const NOISE_WINDOW_SECONDS: f32 = 0.01;

/// Downward expander keyed off the ambient noise floor. The floor is taken
/// from the quietest decile of 10 ms RMS windows, so sustained speech does
/// not contaminate the estimate.
fn reduce_noise_floor(samples: &mut [f32], sample_rate: u32) {
    let window = ((sample_rate as f32 * NOISE_WINDOW_SECONDS).round() as usize).max(1);
    let mut window_rms: Vec<f32> = samples
        .chunks(window)
        .map(rms)
        .collect();
    if window_rms.len() < 4 {
        return;
    }
    window_rms.sort_by(f32::total_cmp);
    let decile = (window_rms.len() / 10).max(1);
    let floor = window_rms[..decile].iter().sum::<f32>() / decile as f32;
    if floor <= 0.0 {
        return;
    }
    let gate = floor * 2.0;
    for chunk in samples.chunks_mut(window) {
        let level = rms(chunk);
        if level >= gate || level <= 0.0 {
            continue;
        }
        // Quadratic taper toward zero below the gate keeps transitions soft.
        let ratio = level / gate;
        let gain = ratio * ratio;
        for sample in chunk {
            *sample *= gain;
        }
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .copied()
        .map(|v| {
            let v = sanitize_sample(v) as f64;
            v * v
        })
        .sum();
    ((sum / samples.len() as f64).max(0.0).sqrt()) as f32
}

fn normalize_peak_in_place(samples: &mut [f32], target_peak: f32) {
    let peak = peak(samples);
    if peak <= 0.0 || target_peak <= 0.0 {
        return;
    }
    let gain = target_peak / peak;
    for sample in samples {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}
