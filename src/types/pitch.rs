//! Spelled pitches and intervals.
//!
//! Pitches keep their spelling (step + alteration) so that transposition
//! produces correctly spelled notes and key names, while the encoder only
//! looks at the MIDI number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diatonic step name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    /// Position within the octave, C = 0 .. B = 6.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Semitones above C of the natural step.
    pub fn semitones(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// Step at a (possibly negative or >6) diatonic index, wrapping per octave.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    /// Parses a step letter, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    /// Position of the natural step on the line of fifths (C = 0, G = 1, F = -1).
    fn fifths(self) -> i32 {
        match self {
            Step::F => -1,
            Step::C => 0,
            Step::G => 1,
            Step::D => 2,
            Step::A => 3,
            Step::E => 4,
            Step::B => 5,
        }
    }

    fn as_char(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }
}

/// A spelled pitch. `alter` counts semitones (+1 sharp, -1 flat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Self { step, alter, octave }
    }

    /// MIDI note number; C4 is 60.
    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.step.semitones() + self.alter as i32
    }

    /// Pitch class in 0..12.
    pub fn pitch_class(&self) -> usize {
        self.midi().rem_euclid(12) as usize
    }

    /// Absolute diatonic position (octave * 7 + step).
    pub fn diatonic(&self) -> i32 {
        self.octave as i32 * 7 + self.step.index()
    }

    /// Position on the line of fifths, ignoring octave.
    pub fn fifths(&self) -> i32 {
        self.step.fifths() + 7 * self.alter as i32
    }

    /// Transposes by an interval, re-spelling the alteration so the MIDI
    /// number moves by exactly `interval.semitones`.
    pub fn transpose(&self, interval: Interval) -> Pitch {
        let diatonic = self.diatonic() + interval.diatonic;
        let step = Step::from_index(diatonic);
        let octave = diatonic.div_euclid(7);
        let natural = Pitch::new(step, 0, octave as i8).midi();
        let target = self.midi() + interval.semitones;
        Pitch::new(step, (target - natural) as i8, octave as i8)
    }

    /// Spelling without octave, e.g. `F#` or `Bb`.
    pub fn name(&self) -> String {
        let mut name = self.step.as_char().to_string();
        let accidental = if self.alter >= 0 { '#' } else { 'b' };
        for _ in 0..self.alter.unsigned_abs() {
            name.push(accidental);
        }
        name
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

/// A musical interval as a pair of diatonic steps and semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub diatonic: i32,
    pub semitones: i32,
}

impl Interval {
    pub const UNISON: Interval = Interval {
        diatonic: 0,
        semitones: 0,
    };

    /// The interval that takes `from` to `to`.
    pub fn between(from: &Pitch, to: &Pitch) -> Self {
        Self {
            diatonic: to.diatonic() - from.diatonic(),
            semitones: to.midi() - from.midi(),
        }
    }

    /// How far the interval moves along the line of fifths.
    pub fn fifths(&self) -> i32 {
        let c = Pitch::new(Step::C, 0, 4);
        c.transpose(*self).fifths() - c.fifths()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.semitones < 0 || (self.semitones == 0 && self.diatonic < 0) {
            "down"
        } else {
            "up"
        };
        write!(
            f,
            "{} {} semitones ({} steps)",
            direction,
            self.semitones.abs(),
            self.diatonic.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_numbers() {
        assert_eq!(Pitch::new(Step::C, 0, 4).midi(), 60);
        assert_eq!(Pitch::new(Step::A, 0, 4).midi(), 69);
        assert_eq!(Pitch::new(Step::F, 1, 4).midi(), 66);
        assert_eq!(Pitch::new(Step::C, -1, 4).midi(), 59);
        assert_eq!(Pitch::new(Step::C, 0, 3).midi(), 48);
    }

    #[test]
    fn transpose_respells() {
        // G major down a fifth to C: F#4 becomes B3.
        let g = Pitch::new(Step::G, 0, 4);
        let c = Pitch::new(Step::C, 0, 4);
        let down_fifth = Interval::between(&g, &c);
        assert_eq!(down_fifth.semitones, -7);
        assert_eq!(down_fifth.diatonic, -4);

        let f_sharp = Pitch::new(Step::F, 1, 4);
        assert_eq!(f_sharp.transpose(down_fifth), Pitch::new(Step::B, 0, 3));
    }

    #[test]
    fn transpose_flat_key_uses_flats() {
        // E-flat up to ... C: A-flat4 lands on F4.
        let e_flat = Pitch::new(Step::E, -1, 4);
        let c = Pitch::new(Step::C, 0, 4);
        let interval = Interval::between(&e_flat, &c);
        let a_flat = Pitch::new(Step::A, -1, 4);
        assert_eq!(a_flat.transpose(interval), Pitch::new(Step::F, 0, 4));
    }

    #[test]
    fn interval_fifths() {
        let g = Pitch::new(Step::G, 0, 4);
        let c = Pitch::new(Step::C, 0, 4);
        assert_eq!(Interval::between(&g, &c).fifths(), -1);
        assert_eq!(Interval::between(&c, &g).fifths(), 1);
        assert_eq!(Interval::UNISON.fifths(), 0);
    }

    #[test]
    fn pitch_display() {
        assert_eq!(Pitch::new(Step::F, 1, 5).to_string(), "F#5");
        assert_eq!(Pitch::new(Step::B, -1, 3).to_string(), "Bb3");
        assert_eq!(Step::from_index(-1), Step::B);
        assert_eq!(Step::from_char('e'), Some(Step::E));
        assert_eq!(Step::from_char('h'), None);
    }
}
