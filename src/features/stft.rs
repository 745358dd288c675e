//! Short-time Fourier analysis and per-frame spectral descriptors.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::config::{CONTRAST_BANDS, FRAME_SIZE, HOP_SIZE};

/// Spectral descriptors for one analysis frame.
#[derive(Debug, Clone)]
pub(crate) struct SpectralFrame {
    pub(crate) centroid_hz: f32,
    pub(crate) rolloff_hz: f32,
    pub(crate) flatness: f32,
    pub(crate) bandwidth_hz: f32,
    pub(crate) contrast: [f32; CONTRAST_BANDS],
}

/// Power spectra plus spectral descriptors for every frame of a recording.
pub(crate) struct StftFrames {
    pub(crate) powers: Vec<Vec<f32>>,
    pub(crate) spectral: Vec<SpectralFrame>,
}

const ROLLOFF_FRACTION: f64 = 0.85;
/// Band edges for spectral contrast, in Hz.
const CONTRAST_EDGES: [(f32, f32); CONTRAST_BANDS] =
    [(200.0, 800.0), (800.0, 2_000.0), (2_000.0, 4_000.0), (4_000.0, 8_000.0)];

pub(crate) struct StftAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    sample_rate: u32,
}

impl StftAnalyzer {
    pub(crate) fn new(sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(FRAME_SIZE),
            window: hann_window(FRAME_SIZE),
            sample_rate,
        }
    }

    /// Frame the signal (FRAME_SIZE / HOP_SIZE), window, transform and
    /// describe each frame. Short signals are zero-padded to one frame.
    pub(crate) fn analyze(&self, samples: &[f32]) -> StftFrames {
        let frame_count = if samples.len() >= FRAME_SIZE {
            1 + (samples.len() - FRAME_SIZE) / HOP_SIZE
        } else {
            1
        };
        let mut powers = Vec::with_capacity(frame_count);
        let mut spectral = Vec::with_capacity(frame_count);
        let mut buffer = vec![Complex::new(0.0_f32, 0.0_f32); FRAME_SIZE];
        for frame in 0..frame_count {
            let start = frame * HOP_SIZE;
            for (i, cell) in buffer.iter_mut().enumerate() {
                let sample = samples.get(start + i).copied().unwrap_or(0.0);
                *cell = Complex::new(sample * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            let power = power_spectrum(&buffer);
            spectral.push(self.describe(&power));
            powers.push(power);
        }
        StftFrames { powers, spectral }
    }

    fn describe(&self, power: &[f32]) -> SpectralFrame {
        let (total, centroid_hz) = centroid(power, self.sample_rate);
        SpectralFrame {
            centroid_hz,
            rolloff_hz: rolloff(power, self.sample_rate, total),
            flatness: flatness(power),
            bandwidth_hz: bandwidth(power, self.sample_rate, total, centroid_hz),
            contrast: contrast(power, self.sample_rate),
        }
    }

    pub(crate) fn bin_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / FRAME_SIZE as f32
    }
}

pub(crate) fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = (length - 1) as f32;
    (0..length)
        .map(|n| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / denom).cos()))
        .collect()
}

fn power_spectrum(fft_out: &[Complex<f32>]) -> Vec<f32> {
    let bins = fft_out.len() / 2 + 1;
    fft_out[..bins]
        .iter()
        .map(|c| (c.re * c.re + c.im * c.im).max(0.0))
        .collect()
}

fn bin_freq(bin: usize, sample_rate: u32) -> f64 {
    bin as f64 * sample_rate as f64 / FRAME_SIZE as f64
}

fn freq_to_bin(freq_hz: f32, sample_rate: u32, bins: usize) -> usize {
    let nyquist = sample_rate.max(1) as f32 * 0.5;
    let freq = freq_hz.clamp(0.0, nyquist);
    (((freq * FRAME_SIZE as f32) / sample_rate.max(1) as f32).floor() as usize).min(bins - 1)
}

fn centroid(power: &[f32], sample_rate: u32) -> (f64, f32) {
    let mut sum = 0.0_f64;
    let mut weighted = 0.0_f64;
    for (bin, &p) in power.iter().enumerate() {
        let p = p as f64;
        sum += p;
        weighted += p * bin_freq(bin, sample_rate);
    }
    if sum <= 0.0 {
        return (0.0, 0.0);
    }
    (sum, (weighted / sum) as f32)
}

fn rolloff(power: &[f32], sample_rate: u32, total: f64) -> f32 {
    if total <= 0.0 {
        return 0.0;
    }
    let target = total * ROLLOFF_FRACTION;
    let mut cumulative = 0.0_f64;
    for (bin, &p) in power.iter().enumerate() {
        cumulative += p as f64;
        if cumulative >= target {
            return bin_freq(bin, sample_rate) as f32;
        }
    }
    sample_rate as f32 * 0.5
}

fn flatness(power: &[f32]) -> f32 {
    if power.is_empty() {
        return 0.0;
    }
    let eps = 1e-12_f64;
    let mut log_sum = 0.0_f64;
    let mut arith = 0.0_f64;
    for &p in power {
        let p = p as f64 + eps;
        log_sum += p.ln();
        arith += p;
    }
    let n = power.len() as f64;
    let geometric = (log_sum / n).exp();
    (geometric / (arith / n)) as f32
}

fn bandwidth(power: &[f32], sample_rate: u32, total: f64, centroid_hz: f32) -> f32 {
    if total <= 0.0 {
        return 0.0;
    }
    let centroid = centroid_hz as f64;
    let mut weighted = 0.0_f64;
    for (bin, &p) in power.iter().enumerate() {
        let diff = bin_freq(bin, sample_rate) - centroid;
        weighted += diff * diff * p as f64;
    }
    (weighted / total).sqrt() as f32
}

/// Per-band peak-to-valley contrast: log ratio of the top quintile of bin
/// power to the bottom quintile inside each band.
fn contrast(power: &[f32], sample_rate: u32) -> [f32; CONTRAST_BANDS] {
    let mut out = [0.0_f32; CONTRAST_BANDS];
    for (band, &(lo, hi)) in CONTRAST_EDGES.iter().enumerate() {
        let lo_bin = freq_to_bin(lo, sample_rate, power.len());
        let hi_bin = freq_to_bin(hi, sample_rate, power.len()).max(lo_bin + 1);
        let mut bins: Vec<f32> = power[lo_bin..hi_bin.min(power.len())].to_vec();
        if bins.len() < 5 {
            continue;
        }
        bins.sort_by(f32::total_cmp);
        let quintile = (bins.len() / 5).max(1);
        let valley: f32 = bins[..quintile].iter().sum::<f32>() / quintile as f32;
        let peak: f32 = bins[bins.len() - quintile..].iter().sum::<f32>() / quintile as f32;
        out[band] = ((peak as f64 + 1e-10).ln() - (valley as f64 + 1e-10).ln()) as f32;
    }
    out
}
