//! Duration filtering and time-series encoding of scores.
//!
//! - [`has_acceptable_durations`]: reject songs with unusual rhythms
//! - [`encode_song`] / [`decode_song`]: score ⇄ fixed-time-step token string
//! - [`Token`]: the symbols that appear in encoded songs and the corpus

pub mod encoder;
pub mod filter;

// Re-export commonly used items
pub use encoder::{
    decode_song, encode_song, fits_grid, DecodedEvent, Token, DEFAULT_TIME_STEP, DELIMITER_SYMBOL,
    HOLD_SYMBOL, REST_SYMBOL,
};
pub use filter::{first_unacceptable_duration, has_acceptable_durations, ACCEPTABLE_DURATIONS};
