//! Core types for folkseq.
//!
//! This module re-exports the music model the pipeline works on:
//! - [`Pitch`], [`Step`], [`Interval`]: spelled pitches and transposition
//! - [`Key`], [`KeySignature`], [`TimeSignature`]: measure annotations
//! - [`Score`], [`Part`], [`Measure`], [`Event`]: a parsed song

mod key;
mod pitch;
mod score;

// Re-export all types at the module level
pub use key::{Key, KeySignature, Mode, TimeSignature};
pub use pitch::{Interval, Pitch, Step};
pub use score::{Event, EventKind, Measure, Part, Score};
