//! Feature extraction: framing, spectral descriptors, MFCCs, chroma/tonnetz,
//! pitch tracking and statistical aggregation.
//!
//! Extraction is deterministic and pure; one cleaned waveform always yields
//! one identical [`FeatureVector`]. The per-frame pitch, energy, ZCR and
//! MFCC sequences survive aggregation in [`FrameSeries`] because the
//! detection stage needs them for temporal analysis.

mod chroma;
mod mel;
mod pitch;
pub mod stats;
mod stft;

use tracing::debug;

use crate::config::{CONTRAST_BANDS, EngineConfig, FRAME_SIZE, HOP_SIZE, MFCC_COUNT, TONNETZ_DIMS};
use crate::error::AnalysisError;
use crate::preprocess::CleanAudio;
use stats::SeriesStats;

/// Aggregated, read-only feature vector shared by every downstream analyzer.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub duration_seconds: f32,
    pub sample_rate: u32,
    pub total_frames: usize,
    pub voiced_frames: usize,

    pub mfcc_mean: Vec<f32>,
    pub mfcc_std: Vec<f32>,
    /// Frame-to-frame MFCC spread, averaged across coefficients.
    pub mfcc_pooled_std: f32,

    pub centroid_hz: SeriesStats,
    pub rolloff_hz: SeriesStats,
    pub bandwidth_hz: SeriesStats,
    pub flatness: SeriesStats,
    /// Mean spectral contrast per band, low to high.
    pub contrast_bands: [f32; CONTRAST_BANDS],
    /// Stats of the per-frame mean contrast across bands.
    pub contrast: SeriesStats,

    pub tonnetz_mean: [f32; TONNETZ_DIMS],
    pub tonnetz_std: [f32; TONNETZ_DIMS],
    /// Spread of the whole chroma matrix, matching the calibration data.
    pub chroma_pooled_std: f32,

    pub zcr: SeriesStats,
    pub energy: SeriesStats,
    /// Pitch statistics over voiced frames only.
    pub pitch_hz: SeriesStats,
}

/// Raw per-frame sequences retained for temporal analysis.
#[derive(Debug, Clone)]
pub struct FrameSeries {
    pub pitch_hz: Vec<f32>,
    pub voiced: Vec<bool>,
    pub energy: Vec<f32>,
    pub zcr: Vec<f32>,
    pub mfcc: Vec<Vec<f32>>,
    pub frames_per_second: f32,
}

#[cfg(test)]
impl FeatureVector {
    /// All-zero vector for tests that poke individual fields.
    pub(crate) fn zeroed_for_tests() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: crate::config::ANALYSIS_SAMPLE_RATE,
            total_frames: 0,
            voiced_frames: 0,
            mfcc_mean: vec![0.0; MFCC_COUNT],
            mfcc_std: vec![0.0; MFCC_COUNT],
            mfcc_pooled_std: 0.0,
            centroid_hz: SeriesStats::zero(),
            rolloff_hz: SeriesStats::zero(),
            bandwidth_hz: SeriesStats::zero(),
            flatness: SeriesStats::zero(),
            contrast_bands: [0.0; CONTRAST_BANDS],
            contrast: SeriesStats::zero(),
            tonnetz_mean: [0.0; TONNETZ_DIMS],
            tonnetz_std: [0.0; TONNETZ_DIMS],
            chroma_pooled_std: 0.0,
            zcr: SeriesStats::zero(),
            energy: SeriesStats::zero(),
            pitch_hz: SeriesStats::zero(),
        }
    }
}

impl FrameSeries {
    pub fn voiced_pitch(&self) -> Vec<f32> {
        self.pitch_hz
            .iter()
            .zip(&self.voiced)
            .filter_map(|(&hz, &voiced)| voiced.then_some(hz))
            .collect()
    }
}

/// Extract the feature vector and per-frame series from cleaned audio.
pub fn extract(
    audio: &CleanAudio,
    config: &EngineConfig,
) -> Result<(FeatureVector, FrameSeries), AnalysisError> {
    let analyzer = stft::StftAnalyzer::new(audio.sample_rate);
    let frames = analyzer.analyze(&audio.samples);
    let mel_bank = mel::MelBank::new(audio.sample_rate);
    let track = pitch::track_pitch(&audio.samples, audio.sample_rate);

    let frame_count = frames.powers.len();
    let mut mfcc_frames = Vec::with_capacity(frame_count);
    let mut chroma_values = Vec::new();
    let mut tonnetz_frames = Vec::with_capacity(frame_count);
    for power in &frames.powers {
        mfcc_frames.push(mel_bank.mfcc(power));
        let chroma = chroma::chroma_from_power(power, audio.sample_rate);
        chroma_values.extend_from_slice(&chroma);
        tonnetz_frames.push(chroma::tonnetz_from_chroma(&chroma));
    }

    let energy = frame_series(&audio.samples, frame_count, frame_rms);
    let zcr = frame_series(&audio.samples, frame_count, frame_zcr);

    let voiced_frames = track.voiced_count();
    if voiced_frames < config.min_voiced_frames {
        return Err(AnalysisError::InsufficientVoicedFrames {
            found: voiced_frames,
            required: config.min_voiced_frames,
        });
    }

    let centroid: Vec<f32> = frames.spectral.iter().map(|f| f.centroid_hz).collect();
    let rolloff: Vec<f32> = frames.spectral.iter().map(|f| f.rolloff_hz).collect();
    let band: Vec<f32> = frames.spectral.iter().map(|f| f.bandwidth_hz).collect();
    let flat: Vec<f32> = frames.spectral.iter().map(|f| f.flatness).collect();
    let contrast_per_frame: Vec<f32> = frames
        .spectral
        .iter()
        .map(|f| f.contrast.iter().sum::<f32>() / CONTRAST_BANDS as f32)
        .collect();
    let mut contrast_bands = [0.0_f32; CONTRAST_BANDS];
    for frame in &frames.spectral {
        for (sum, &value) in contrast_bands.iter_mut().zip(frame.contrast.iter()) {
            *sum += value;
        }
    }
    for value in &mut contrast_bands {
        *value /= frame_count.max(1) as f32;
    }

    let voiced_pitch = track.voiced_values();
    let mfcc_std = column_stds(&mfcc_frames, MFCC_COUNT);
    let mfcc_pooled_std = stats::mean(&mfcc_std);

    let vector = FeatureVector {
        duration_seconds: audio.duration_seconds,
        sample_rate: audio.sample_rate,
        total_frames: frame_count,
        voiced_frames,
        mfcc_mean: column_means(&mfcc_frames, MFCC_COUNT),
        mfcc_std,
        mfcc_pooled_std,
        centroid_hz: SeriesStats::from_series(&centroid),
        rolloff_hz: SeriesStats::from_series(&rolloff),
        bandwidth_hz: SeriesStats::from_series(&band),
        flatness: SeriesStats::from_series(&flat),
        contrast_bands,
        contrast: SeriesStats::from_series(&contrast_per_frame),
        tonnetz_mean: array_means(&tonnetz_frames),
        tonnetz_std: array_stds(&tonnetz_frames),
        chroma_pooled_std: SeriesStats::from_series(&chroma_values).std,
        zcr: SeriesStats::from_series(&zcr),
        energy: SeriesStats::from_series(&energy),
        pitch_hz: SeriesStats::from_series(&voiced_pitch),
    };
    debug!(
        frames = frame_count,
        voiced = voiced_frames,
        centroid_mean = vector.centroid_hz.mean,
        pitch_mean = vector.pitch_hz.mean,
        "extracted feature vector"
    );

    let series = FrameSeries {
        pitch_hz: track.pitch_hz,
        voiced: track.voiced,
        energy,
        zcr,
        mfcc: mfcc_frames,
        frames_per_second: audio.sample_rate as f32 / HOP_SIZE as f32,
    };
    Ok((vector, series))
}

fn frame_series(
    samples: &[f32],
    frame_count: usize,
    per_frame: impl Fn(&[f32]) -> f32,
) -> Vec<f32> {
    (0..frame_count)
        .map(|frame| {
            let start = (frame * HOP_SIZE).min(samples.len());
            let end = (start + FRAME_SIZE).min(samples.len());
            per_frame(&samples[start..end])
        })
        .collect()
}

fn frame_rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f64 = window.iter().map(|&v| v as f64 * v as f64).sum();
    ((sum / window.len() as f64).sqrt()) as f32
}

/// Sign-change rate per sample (0..1).
fn frame_zcr(window: &[f32]) -> f32 {
    if window.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0usize;
    for pair in window.windows(2) {
        if (pair[0] >= 0.0) != (pair[1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / (window.len() - 1) as f32
}

fn column_means(rows: &[Vec<f32>], width: usize) -> Vec<f32> {
    if rows.is_empty() {
        return vec![0.0; width];
    }
    let mut sums = vec![0.0_f64; width];
    for row in rows {
        for (sum, &value) in sums.iter_mut().zip(row) {
            *sum += value as f64;
        }
    }
    sums.into_iter().map(|s| (s / rows.len() as f64) as f32).collect()
}

fn column_stds(rows: &[Vec<f32>], width: usize) -> Vec<f32> {
    let means = column_means(rows, width);
    if rows.is_empty() {
        return vec![0.0; width];
    }
    let mut vars = vec![0.0_f64; width];
    for row in rows {
        for ((var, &value), &mean) in vars.iter_mut().zip(row).zip(&means) {
            let d = value as f64 - mean as f64;
            *var += d * d;
        }
    }
    vars.into_iter()
        .map(|v| ((v / rows.len() as f64).sqrt()) as f32)
        .collect()
}

fn array_means<const N: usize>(rows: &[[f32; N]]) -> [f32; N] {
    let mut out = [0.0_f32; N];
    if rows.is_empty() {
        return out;
    }
    for row in rows {
        for (sum, &value) in out.iter_mut().zip(row.iter()) {
            *sum += value;
        }
    }
    for value in &mut out {
        *value /= rows.len() as f32;
    }
    out
}

fn array_stds<const N: usize>(rows: &[[f32; N]]) -> [f32; N] {
    let means = array_means(rows);
    let mut out = [0.0_f32; N];
    if rows.is_empty() {
        return out;
    }
    for row in rows {
        for ((var, &value), &mean) in out.iter_mut().zip(row.iter()).zip(means.iter()) {
            let d = value - mean;
            *var += d * d;
        }
    }
    for value in &mut out {
        *value = (*value / rows.len() as f32).sqrt();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS_SAMPLE_RATE;
    use crate::preprocess;

    fn clean_tone(freq: f32, seconds: f32) -> CleanAudio {
        let sr = ANALYSIS_SAMPLE_RATE;
        let samples: Vec<f32> = (0..(seconds * sr as f32) as usize)
            .map(|i| 0.6 * (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect();
        preprocess::preprocess(&samples, sr, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn extraction_is_deterministic() {
        let audio = clean_tone(180.0, 1.0);
        let config = EngineConfig::default();
        let (a, _) = extract(&audio, &config).unwrap();
        let (b, _) = extract(&audio, &config).unwrap();
        assert_eq!(a.mfcc_mean, b.mfcc_mean);
        assert_eq!(a.centroid_hz, b.centroid_hz);
        assert_eq!(a.pitch_hz, b.pitch_hz);
    }

    #[test]
    fn steady_tone_is_voiced_with_matching_pitch() {
        let audio = clean_tone(150.0, 1.0);
        let (vector, series) = extract(&audio, &EngineConfig::default()).unwrap();
        assert!(vector.voiced_frames >= EngineConfig::default().min_voiced_frames);
        assert!((vector.pitch_hz.mean - 150.0).abs() < 10.0);
        assert_eq!(series.pitch_hz.len(), vector.total_frames);
        assert_eq!(series.mfcc.len(), vector.total_frames);
        assert_eq!(series.mfcc[0].len(), MFCC_COUNT);
    }

    #[test]
    fn unvoiced_noise_fails_with_insufficient_voiced_frames() {
        let sr = ANALYSIS_SAMPLE_RATE;
        let mut state = 0x1234_5678_u32;
        let samples: Vec<f32> = (0..sr as usize)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                0.5 * ((state >> 16) as f32 / 32_768.0 - 1.0)
            })
            .collect();
        let audio =
            preprocess::preprocess(&samples, sr, &EngineConfig::default()).unwrap();
        let result = extract(&audio, &EngineConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientVoicedFrames { .. })
        ));
    }
}
