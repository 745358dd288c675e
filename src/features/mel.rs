//! Mel filterbank and MFCC computation.

use crate::config::{FRAME_SIZE, MEL_BANDS, MFCC_COUNT};

const MEL_F_MIN: f32 = 40.0;

/// Triangular mel filterbank with a cached DCT-II basis for MFCCs.
pub(crate) struct MelBank {
    filters: Vec<Vec<(usize, f32)>>,
    dct_basis: Vec<Vec<f32>>,
}

impl MelBank {
    pub(crate) fn new(sample_rate: u32) -> Self {
        let f_max = sample_rate as f32 * 0.5;
        let edges = filter_edges(sample_rate, MEL_F_MIN, f_max);
        Self {
            filters: build_filters(&edges),
            dct_basis: dct_basis(MEL_BANDS, MFCC_COUNT),
        }
    }

    /// MFCC vector (MFCC_COUNT coefficients) from one power spectrum.
    pub(crate) fn mfcc(&self, power: &[f32]) -> Vec<f32> {
        let log_energies: Vec<f64> = self
            .filters
            .iter()
            .map(|filter| {
                let mut sum = 0.0_f64;
                for &(bin, weight) in filter {
                    sum += power.get(bin).copied().unwrap_or(0.0).max(0.0) as f64
                        * weight as f64;
                }
                sum.max(1e-12).ln()
            })
            .collect();
        self.dct_basis
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&log_energies)
                    .map(|(&c, &e)| c as f64 * e)
                    .sum::<f64>() as f32
            })
            .collect()
    }
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// FFT bin indices of the MEL_BANDS + 2 filter edge frequencies.
fn filter_edges(sample_rate: u32, f_min: f32, f_max: f32) -> Vec<usize> {
    let nyquist = sample_rate.max(1) as f32 * 0.5;
    let f_max = f_max.min(nyquist).max(f_min);
    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max);
    (0..MEL_BANDS + 2)
        .map(|i| {
            let t = i as f32 / (MEL_BANDS + 1) as f32;
            let hz = mel_to_hz(mel_min + (mel_max - mel_min) * t);
            let bin = (hz * FRAME_SIZE as f32 / sample_rate.max(1) as f32).floor() as usize;
            bin.min(FRAME_SIZE / 2)
        })
        .collect()
}

fn build_filters(edges: &[usize]) -> Vec<Vec<(usize, f32)>> {
    let mut filters = Vec::with_capacity(MEL_BANDS);
    for m in 0..MEL_BANDS {
        let left = edges[m];
        let center = edges[m + 1].max(left);
        let right = edges[m + 2].max(center + 1);
        let mut weights = Vec::new();
        for bin in left..=right {
            let w = if bin < center {
                if center == left {
                    0.0
                } else {
                    (bin - left) as f32 / (center - left) as f32
                }
            } else if right == center {
                0.0
            } else {
                (right - bin) as f32 / (right - center) as f32
            };
            if w > 0.0 {
                weights.push((bin, w));
            }
        }
        filters.push(weights);
    }
    filters
}

fn dct_basis(input_len: usize, output_len: usize) -> Vec<Vec<f32>> {
    let n = input_len.max(1) as f64;
    (0..output_len)
        .map(|k| {
            (0..input_len)
                .map(|m| {
                    let angle = std::f64::consts::PI * k as f64 * (m as f64 + 0.5) / n;
                    angle.cos() as f32
                })
                .collect()
        })
        .collect()
}
