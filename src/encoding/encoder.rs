//! Time-series encoding of scores.
//!
//! Every event is sampled on a fixed time grid: the first step carries the
//! event's symbol (MIDI number or `r`), the remaining steps carry `_`.
//!
//! ```text
//! pitch 60, 1.0 quarter lengths, time step 0.25  ->  60 _ _ _
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{PipelineError, Result};
use crate::types::{EventKind, Score};

/// Default grid resolution, a sixteenth note.
pub const DEFAULT_TIME_STEP: f64 = 0.25;

/// Symbol for a rest onset.
pub const REST_SYMBOL: &str = "r";

/// Symbol for "previous note or rest still sounding".
pub const HOLD_SYMBOL: &str = "_";

/// Symbol separating songs in the corpus.
pub const DELIMITER_SYMBOL: &str = "/";

/// Tolerance when checking that a duration sits on the time grid.
const GRID_EPSILON: f64 = 1e-9;

/// One symbol of an encoded song or corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Note onset, as a MIDI number.
    Pitch(i32),
    /// Rest onset.
    Rest,
    /// Continuation of the previous onset.
    Hold,
    /// Song boundary.
    Delimiter,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Pitch(midi) => write!(f, "{}", midi),
            Token::Rest => f.write_str(REST_SYMBOL),
            Token::Hold => f.write_str(HOLD_SYMBOL),
            Token::Delimiter => f.write_str(DELIMITER_SYMBOL),
        }
    }
}

impl FromStr for Token {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            REST_SYMBOL => Ok(Token::Rest),
            HOLD_SYMBOL => Ok(Token::Hold),
            DELIMITER_SYMBOL => Ok(Token::Delimiter),
            _ => s
                .parse::<i32>()
                .map(Token::Pitch)
                .map_err(|_| PipelineError::unknown_token(s)),
        }
    }
}

/// A note (`pitch = Some(midi)`) or rest reconstructed from an encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedEvent {
    pub pitch: Option<i32>,
    pub quarter_length: f64,
}

/// Returns true if `quarter_length` is a whole number of `time_step` grid steps.
pub fn fits_grid(quarter_length: f64, time_step: f64) -> bool {
    let ratio = quarter_length / time_step;
    (ratio - ratio.round()).abs() <= GRID_EPSILON
}

/// Number of grid steps covered by a duration.
fn steps_for(quarter_length: f64, time_step: f64) -> Result<usize> {
    if !fits_grid(quarter_length, time_step) {
        return Err(PipelineError::unsupported_duration(quarter_length, time_step));
    }
    Ok((quarter_length / time_step).round() as usize)
}

/// Encodes a score into tokens, one per time step.
pub fn encode_tokens(score: &Score, time_step: f64) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for event in score.flat_events() {
        let symbol = match &event.kind {
            EventKind::Note(pitch) => Token::Pitch(pitch.midi()),
            EventKind::Rest => Token::Rest,
            EventKind::Chord(pitches) => {
                return Err(PipelineError::unsupported_event(format!(
                    "chord of {} pitches",
                    pitches.len()
                )))
            }
        };

        let steps = steps_for(event.quarter_length, time_step)?;
        tokens.extend((0..steps).map(|step| if step == 0 { symbol } else { Token::Hold }));
    }

    Ok(tokens)
}

/// Encodes a score as a space-separated token string.
///
/// # Example
///
/// ```ignore
/// use folkseq::encoding::encode_song;
/// use folkseq::kern::parse_kern;
///
/// let score = parse_kern("**kern\n4c\n8r\n*-\n")?;
/// assert_eq!(encode_song(&score, 0.25)?, "60 _ _ _ r _");
/// ```
pub fn encode_song(score: &Score, time_step: f64) -> Result<String> {
    let tokens = encode_tokens(score, time_step)?;
    Ok(tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

/// Reconstructs the (pitch/rest, duration) sequence of an encoded song.
pub fn decode_song(encoded: &str, time_step: f64) -> Result<Vec<DecodedEvent>> {
    let mut events: Vec<DecodedEvent> = Vec::new();

    for raw in encoded.split_whitespace() {
        let pitch = match raw.parse::<Token>()? {
            Token::Pitch(midi) => Some(midi),
            Token::Rest => None,
            Token::Hold => {
                let last = events
                    .last_mut()
                    .ok_or_else(|| PipelineError::unknown_token(format!("{} at song start", raw)))?;
                last.quarter_length += time_step;
                continue;
            }
            Token::Delimiter => return Err(PipelineError::unknown_token(raw)),
        };
        events.push(DecodedEvent {
            pitch,
            quarter_length: time_step,
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::kern::parse_kern;

    #[test]
    fn single_note_spans_duration_over_time_step() {
        let score = parse_kern("**kern\n2.c\n*-\n").unwrap();
        let encoded = encode_song(&score, 0.25).unwrap();
        let tokens: Vec<&str> = encoded.split(' ').collect();
        assert_eq!(tokens.len(), 12);
        assert_eq!(tokens[0], "60");
        assert!(tokens[1..].iter().all(|t| *t == "_"));
    }

    #[test]
    fn encodes_notes_and_rests() {
        let score = parse_kern("**kern\n4c\n8r\n8.d\n16e\n*-\n").unwrap();
        assert_eq!(
            encode_song(&score, 0.25).unwrap(),
            "60 _ _ _ r _ 62 _ _ 64"
        );
        assert_eq!(encode_song(&score, 0.5).unwrap_err().code, ErrorCode::UnsupportedDuration);
    }

    #[test]
    fn coarser_time_step() {
        let score = parse_kern("**kern\n4c\n2r\n*-\n").unwrap();
        assert_eq!(encode_song(&score, 1.0).unwrap(), "60 r _");
    }

    #[test]
    fn grid_fit() {
        assert!(fits_grid(0.75, 0.25));
        assert!(fits_grid(0.0, 0.25));
        assert!(!fits_grid(0.75, 0.5));
        assert!(!fits_grid(1.0 / 3.0, 0.25));
    }

    #[test]
    fn chords_are_rejected() {
        let score = parse_kern("**kern\n4c 4e\n*-\n").unwrap();
        let err = encode_song(&score, DEFAULT_TIME_STEP).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedEvent);
    }

    #[test]
    fn decode_reverses_encode() {
        let score = parse_kern("**kern\n4c\n8r\n8.d\n16e\n2.f#\n*-\n").unwrap();
        let encoded = encode_song(&score, 0.25).unwrap();
        let decoded = decode_song(&encoded, 0.25).unwrap();

        let original: Vec<DecodedEvent> = score
            .flat_events()
            .iter()
            .map(|e| DecodedEvent {
                pitch: e.pitches().first().map(|p| p.midi()),
                quarter_length: e.quarter_length,
            })
            .collect();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_rejects_bad_tokens() {
        assert_eq!(decode_song("_ 60", 0.25).unwrap_err().code, ErrorCode::UnknownToken);
        assert_eq!(decode_song("60 x", 0.25).unwrap_err().code, ErrorCode::UnknownToken);
        assert_eq!(decode_song("60 /", 0.25).unwrap_err().code, ErrorCode::UnknownToken);
    }

    #[test]
    fn token_round_trip() {
        for text in ["60", "r", "_", "/", "-3"] {
            assert_eq!(text.parse::<Token>().unwrap().to_string(), text);
        }
    }
}
