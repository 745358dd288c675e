//! Feature-based language scoring over spectral statistics.
//!
//! Each supported language gets points for every acoustic statistic that
//! falls inside its characteristic band. The winning score maps onto a
//! fixed confidence ladder, with a low-confidence English fallback.

use crate::features::FeatureVector;

use super::Language;

/// Exclusive band, matching the strict comparisons of the scoring rules.
#[derive(Debug, Clone, Copy)]
struct Band {
    low: f32,
    high: f32,
}

impl Band {
    const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    fn contains(&self, value: f32) -> bool {
        self.low < value && value < self.high
    }
}

struct LanguageProfile {
    language: Language,
    /// Centroid and rolloff must both match to earn the spectral points.
    centroid_hz: Band,
    rolloff_hz: Band,
    spectral_points: u32,
    zcr: Band,
    zcr_points: u32,
    bandwidth_hz: Band,
    bandwidth_points: u32,
    mfcc_std: Band,
    mfcc_points: u32,
}

/// Order matters: ties resolve to the earliest entry.
static PROFILES: [LanguageProfile; 4] = [
    LanguageProfile {
        language: Language::Kn,
        centroid_hz: Band::new(1_100.0, 1_900.0),
        rolloff_hz: Band::new(1_800.0, 3_500.0),
        spectral_points: 3,
        zcr: Band::new(0.02, 0.11),
        zcr_points: 2,
        bandwidth_hz: Band::new(800.0, 1_400.0),
        bandwidth_points: 2,
        mfcc_std: Band::new(0.8, 1.8),
        mfcc_points: 1,
    },
    LanguageProfile {
        language: Language::Te,
        centroid_hz: Band::new(1_500.0, 2_200.0),
        rolloff_hz: Band::new(3_000.0, 4_500.0),
        spectral_points: 3,
        zcr: Band::new(0.05, 0.14),
        zcr_points: 2,
        bandwidth_hz: Band::new(1_000.0, 1_600.0),
        bandwidth_points: 2,
        mfcc_std: Band::new(1.0, 2.0),
        mfcc_points: 1,
    },
    LanguageProfile {
        language: Language::Hi,
        centroid_hz: Band::new(1_300.0, 2_000.0),
        rolloff_hz: Band::new(2_200.0, 4_000.0),
        spectral_points: 3,
        zcr: Band::new(0.04, 0.13),
        zcr_points: 2,
        bandwidth_hz: Band::new(900.0, 1_500.0),
        bandwidth_points: 2,
        mfcc_std: Band::new(0.9, 1.9),
        mfcc_points: 1,
    },
    // English carries wider bands and heavier points so generic
    // broadband speech lands here rather than on a narrow profile.
    LanguageProfile {
        language: Language::En,
        centroid_hz: Band::new(1_200.0, 4_000.0),
        rolloff_hz: Band::new(2_000.0, 7_000.0),
        spectral_points: 4,
        zcr: Band::new(0.02, 0.25),
        zcr_points: 3,
        bandwidth_hz: Band::new(900.0, 2_200.0),
        bandwidth_points: 2,
        mfcc_std: Band::new(1.0, 3.5),
        mfcc_points: 2,
    },
];

/// Score → confidence ladder, highest band first.
const CONFIDENCE_LADDER: [(u32, f32); 3] = [(6, 0.85), (4, 0.70), (2, 0.55)];
/// Confidence of the English fallback when no profile scores at least 2.
pub(super) const FALLBACK_CONFIDENCE: f32 = 0.40;

#[derive(Debug, Clone)]
pub(super) struct AcousticOutcome {
    pub language: Language,
    pub confidence: f32,
    /// Per-language raw scores, in profile order.
    pub scores: Vec<(Language, u32)>,
}

pub(super) fn identify(features: &FeatureVector) -> AcousticOutcome {
    let scores: Vec<(Language, u32)> = PROFILES
        .iter()
        .map(|profile| (profile.language, profile.score(features)))
        .collect();

    let mut best = scores[0];
    for &candidate in &scores[1..] {
        if candidate.1 > best.1 {
            best = candidate;
        }
    }

    for (threshold, confidence) in CONFIDENCE_LADDER {
        if best.1 >= threshold {
            return AcousticOutcome { language: best.0, confidence, scores };
        }
    }
    AcousticOutcome {
        language: Language::En,
        confidence: FALLBACK_CONFIDENCE,
        scores,
    }
}

impl LanguageProfile {
    fn score(&self, features: &FeatureVector) -> u32 {
        let mut score = 0;
        if self.centroid_hz.contains(features.centroid_hz.mean)
            && self.rolloff_hz.contains(features.rolloff_hz.mean)
        {
            score += self.spectral_points;
        }
        if self.zcr.contains(features.zcr.mean) {
            score += self.zcr_points;
        }
        if self.bandwidth_hz.contains(features.bandwidth_hz.mean) {
            score += self.bandwidth_points;
        }
        if self.mfcc_std.contains(features.mfcc_pooled_std) {
            score += self.mfcc_points;
        }
        score
    }
}
