//! Correlational key finding.
//!
//! Builds a duration-weighted pitch-class histogram and correlates it against
//! the major and minor profile of every tonic. The best-correlated key wins.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::{Key, Mode, Score, Step};

/// Weightings used for key finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyProfile {
    /// Aarden-Essen profiles, derived from the Essen folk-song collection.
    #[default]
    AardenEssen,
    /// Krumhansl-Kessler probe-tone profiles.
    KrumhanslKessler,
}

impl KeyProfile {
    /// Returns the string representation of the profile.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyProfile::AardenEssen => "aarden_essen",
            KeyProfile::KrumhanslKessler => "krumhansl_kessler",
        }
    }

    /// Parses a profile name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "aarden_essen" | "aarden" | "essen" => Some(KeyProfile::AardenEssen),
            "krumhansl_kessler" | "krumhansl" | "kk" => Some(KeyProfile::KrumhanslKessler),
            _ => None,
        }
    }

    /// Profile weights for a tonic on pitch class 0.
    fn weights(&self, mode: Mode) -> [f64; 12] {
        match (self, mode) {
            (KeyProfile::AardenEssen, Mode::Major) => [
                17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062,
                0.145624, 8.15494, 0.232998, 4.95122,
            ],
            (KeyProfile::AardenEssen, Mode::Minor) => [
                18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161,
                4.56621, 1.93186, 7.37619, 1.75623,
            ],
            (KeyProfile::KrumhanslKessler, Mode::Major) => [
                6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
            ],
            (KeyProfile::KrumhanslKessler, Mode::Minor) => [
                6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
            ],
        }
    }
}

impl std::fmt::Display for KeyProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conventional tonic spellings per pitch class.
const MAJOR_TONICS: [(Step, i8); 12] = [
    (Step::C, 0),
    (Step::D, -1),
    (Step::D, 0),
    (Step::E, -1),
    (Step::E, 0),
    (Step::F, 0),
    (Step::F, 1),
    (Step::G, 0),
    (Step::A, -1),
    (Step::A, 0),
    (Step::B, -1),
    (Step::B, 0),
];

const MINOR_TONICS: [(Step, i8); 12] = [
    (Step::C, 0),
    (Step::C, 1),
    (Step::D, 0),
    (Step::E, -1),
    (Step::E, 0),
    (Step::F, 0),
    (Step::F, 1),
    (Step::G, 0),
    (Step::G, 1),
    (Step::A, 0),
    (Step::B, -1),
    (Step::B, 0),
];

/// Total sounding quarter length per pitch class.
pub fn pitch_class_histogram(score: &Score) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for part in &score.parts {
        for event in part.events() {
            for pitch in event.pitches() {
                histogram[pitch.pitch_class()] += event.quarter_length;
            }
        }
    }
    histogram
}

/// Estimates the key of a score.
///
/// Ties are resolved in favour of the first candidate, major keys before
/// minor keys, tonics in ascending pitch-class order.
pub fn estimate_key(score: &Score, profile: KeyProfile) -> Result<Key> {
    let histogram = pitch_class_histogram(score);
    if histogram.iter().all(|&w| w == 0.0) {
        return Err(PipelineError::missing_key_estimate("score has no sounding pitches"));
    }

    let mut best: Option<(f64, Key)> = None;
    for mode in [Mode::Major, Mode::Minor] {
        let weights = profile.weights(mode);
        for tonic in 0..12 {
            let rotated: Vec<f64> = (0..12).map(|pc| weights[(pc + 12 - tonic) % 12]).collect();
            let Some(r) = correlation(&histogram, &rotated) else {
                return Err(PipelineError::missing_key_estimate(
                    "pitch-class distribution is flat",
                ));
            };
            if best.map_or(true, |(best_r, _)| r > best_r) {
                let (step, alter) = match mode {
                    Mode::Major => MAJOR_TONICS[tonic],
                    Mode::Minor => MINOR_TONICS[tonic],
                };
                best = Some((r, Key::new(step, alter, mode)));
            }
        }
    }

    best.map(|(_, key)| key)
        .ok_or_else(|| PipelineError::missing_key_estimate("no candidate keys"))
}

/// Pearson correlation; `None` when either side has zero variance.
fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}
