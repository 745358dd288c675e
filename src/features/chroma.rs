//! Chroma folding and tonnetz projection of power spectra.

use crate::config::{FRAME_SIZE, TONNETZ_DIMS};

const CHROMA_BINS: usize = 12;
/// Reference for pitch-class mapping (A4).
const TUNING_HZ: f32 = 440.0;
/// Ignore spectral content below this frequency when folding chroma.
const CHROMA_F_MIN: f32 = 60.0;

/// Fold one power spectrum into a 12-bin normalized chroma vector.
pub(crate) fn chroma_from_power(power: &[f32], sample_rate: u32) -> [f32; CHROMA_BINS] {
    let mut chroma = [0.0_f32; CHROMA_BINS];
    for (bin, &p) in power.iter().enumerate().skip(1) {
        let freq = bin as f32 * sample_rate as f32 / FRAME_SIZE as f32;
        if freq < CHROMA_F_MIN || p <= 0.0 {
            continue;
        }
        let midi = 69.0 + 12.0 * (freq / TUNING_HZ).log2();
        let class = (midi.round() as i64).rem_euclid(12) as usize;
        chroma[class] += p;
    }
    let total: f32 = chroma.iter().sum();
    if total > 0.0 {
        for value in &mut chroma {
            *value /= total;
        }
    }
    chroma
}

/// Project a chroma vector onto the six tonnetz axes (fifths, minor thirds,
/// major thirds; sine and cosine components of each circle).
pub(crate) fn tonnetz_from_chroma(chroma: &[f32; CHROMA_BINS]) -> [f32; TONNETZ_DIMS] {
    // (interval step in semitones, radius) per harmonic circle.
    const CIRCLES: [(f32, f32); 3] = [(7.0, 1.0), (3.0, 1.0), (4.0, 0.5)];
    let mut out = [0.0_f32; TONNETZ_DIMS];
    for (circle, &(step, radius)) in CIRCLES.iter().enumerate() {
        let mut sin_sum = 0.0_f32;
        let mut cos_sum = 0.0_f32;
        for (class, &weight) in chroma.iter().enumerate() {
            let angle = class as f32 * step * std::f32::consts::PI / 6.0;
            sin_sum += weight * radius * angle.sin();
            cos_sum += weight * radius * angle.cos();
        }
        out[circle * 2] = sin_sum;
        out[circle * 2 + 1] = cos_sum;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS_SAMPLE_RATE;

    #[test]
    fn single_bin_power_maps_to_one_pitch_class() {
        let mut power = vec![0.0_f32; FRAME_SIZE / 2 + 1];
        // Bin nearest 440 Hz at 16 kHz / 512-point FFT.
        let bin = (440.0 * FRAME_SIZE as f32 / ANALYSIS_SAMPLE_RATE as f32).round() as usize;
        power[bin] = 1.0;
        let chroma = chroma_from_power(&power, ANALYSIS_SAMPLE_RATE);
        let active = chroma.iter().filter(|&&v| v > 0.0).count();
        assert_eq!(active, 1);
        assert!((chroma.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tonnetz_of_empty_chroma_is_zero() {
        let tonnetz = tonnetz_from_chroma(&[0.0; CHROMA_BINS]);
        assert!(tonnetz.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn tonnetz_distinguishes_pitch_classes() {
        let mut a = [0.0_f32; CHROMA_BINS];
        let mut b = [0.0_f32; CHROMA_BINS];
        a[0] = 1.0;
        b[6] = 1.0;
        assert_ne!(tonnetz_from_chroma(&a), tonnetz_from_chroma(&b));
    }
}
