//! Key analysis and transposition.
//!
//! - [`estimate_key`]: statistical key-finding over a pitch-class histogram
//! - [`transpose`]: normalise a score to C major / A minor

pub mod key_finder;
pub mod transpose;

// Re-export commonly used items
pub use key_finder::{estimate_key, pitch_class_histogram, KeyProfile};
pub use transpose::{resolve_key, transpose, transpose_with_details, KeySource, Transposition};
