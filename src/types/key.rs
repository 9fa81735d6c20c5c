//! Keys, key signatures and time signatures.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pitch::{Interval, Pitch, Step};

/// Tonal mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

/// A key: tonic pitch (always in octave 4) plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub tonic: Pitch,
    pub mode: Mode,
}

impl Key {
    pub fn new(step: Step, alter: i8, mode: Mode) -> Self {
        Self {
            tonic: Pitch::new(step, alter, 4),
            mode,
        }
    }

    /// Parses the body of a `**kern` key interpretation such as `G:`,
    /// `e-:` or `f#:`. Upper case tonic means major, lower case minor.
    ///
    /// Modal keys (`G:dor`) and the unknown key `?:` return `None`.
    pub fn parse_kern(token: &str) -> Option<Self> {
        let body = token.strip_suffix(':')?;
        let mut chars = body.chars();
        let letter = chars.next()?;
        let step = Step::from_char(letter)?;
        let mode = if letter.is_ascii_uppercase() {
            Mode::Major
        } else {
            Mode::Minor
        };
        let mut alter: i8 = 0;
        for c in chars {
            match c {
                '#' => alter += 1,
                '-' => alter -= 1,
                _ => return None,
            }
        }
        Some(Self::new(step, alter, mode))
    }

    /// The tonic every song is normalised to: C for major keys, A for minor.
    pub fn reference_tonic(&self) -> Pitch {
        match self.mode {
            Mode::Major => Pitch::new(Step::C, 0, 4),
            Mode::Minor => Pitch::new(Step::A, 0, 4),
        }
    }

    /// Interval from this key's tonic to the reference tonic.
    pub fn interval_to_reference(&self) -> Interval {
        Interval::between(&self.tonic, &self.reference_tonic())
    }

    /// Transposes the tonic, keeping it in octave 4.
    pub fn transpose(&self, interval: Interval) -> Self {
        let moved = self.tonic.transpose(interval);
        Self {
            tonic: Pitch::new(moved.step, moved.alter, 4),
            mode: self.mode,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic.name(), self.mode.as_str())
    }
}

/// Key signature as a count of sharps (negative values count flats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub sharps: i32,
}

impl KeySignature {
    /// Parses the body of a `*k[...]` interpretation, e.g. `k[f#c#]` or `k[b-e-]`.
    pub fn parse_kern(token: &str) -> Option<Self> {
        let inner = token.strip_prefix("k[")?.strip_suffix(']')?;
        let mut sharps = 0;
        for c in inner.chars() {
            match c {
                '#' => sharps += 1,
                '-' => sharps -= 1,
                c if Step::from_char(c).is_some() => {}
                _ => return None,
            }
        }
        Some(Self { sharps })
    }

    /// Moves the signature along the line of fifths by the interval.
    pub fn transpose(&self, interval: Interval) -> Self {
        Self {
            sharps: self.sharps + interval.fifths(),
        }
    }
}

/// Time signature, e.g. 3/4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    /// Parses the body of a `*M3/4` interpretation.
    pub fn parse_kern(token: &str) -> Option<Self> {
        let (numerator, denominator) = token.strip_prefix('M')?.split_once('/')?;
        Some(Self {
            numerator: numerator.parse().ok()?,
            denominator: denominator.parse().ok()?,
        })
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
