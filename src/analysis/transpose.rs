//! Transposition to the reference keys.
//!
//! Songs come in 24 keys; normalising them to C major / A minor shrinks the
//! token vocabulary and lets a model learn melodic patterns independent of key.

use log::debug;

use crate::error::Result;
use crate::types::{Interval, Key, Score};

use super::key_finder::{estimate_key, KeyProfile};

/// Where the key used for transposition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key interpretation in the first measure of the first part.
    Annotated,
    /// Statistical key-finding.
    Estimated,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Annotated => "annotated",
            KeySource::Estimated => "estimated",
        }
    }
}

/// A transposed score along with how it was transposed.
#[derive(Debug, Clone)]
pub struct Transposition {
    pub score: Score,
    /// Key of the original score.
    pub key: Key,
    pub source: KeySource,
    pub interval: Interval,
}

/// Determines a score's key: the annotation of the first measure of the
/// first part when present, otherwise an estimate.
pub fn resolve_key(score: &Score, profile: KeyProfile) -> Result<(Key, KeySource)> {
    if let Some(key) = score.annotated_key() {
        return Ok((key, KeySource::Annotated));
    }
    let key = estimate_key(score, profile)?;
    Ok((key, KeySource::Estimated))
}

/// Transposes a score to C major or A minor, reporting the key and interval used.
pub fn transpose_with_details(score: &Score, profile: KeyProfile) -> Result<Transposition> {
    let (key, source) = resolve_key(score, profile)?;
    let interval = key.interval_to_reference();
    debug!(
        "transposing from {} ({}) {}",
        key,
        source.as_str(),
        interval
    );
    Ok(Transposition {
        score: score.transpose(interval),
        key,
        source,
        interval,
    })
}

/// Transposes a score to C major or A minor.
pub fn transpose(score: &Score, profile: KeyProfile) -> Result<Score> {
    transpose_with_details(score, profile).map(|t| t.score)
}
