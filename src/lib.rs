//! folkseq: turns folk-song scores in Humdrum **kern notation into
//! model-ready training sequences.
//!
//! The pipeline loads every score below a dataset directory, drops songs
//! with unusual rhythms, transposes the rest to C major or A minor, encodes
//! them on a fixed time grid, joins them into one corpus, maps symbols to
//! integer IDs and cuts the result into one-hot training windows.
//!
//! # Modules
//!
//! - [`kern`]: **kern parsing and dataset loading
//! - [`types`]: Score model (Pitch, Interval, Key, Score)
//! - [`analysis`]: Key finding and transposition
//! - [`encoding`]: Duration filter and time-series encoder
//! - [`dataset`]: Corpus, vocabulary and training sequences
//! - [`pipeline`]: End-to-end orchestration
//! - [`config`]: Runtime configuration (PipelineConfig)
//! - [`error`]: Error types and codes (PipelineError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use folkseq::{config::PipelineConfig, pipeline};
//!
//! let config = PipelineConfig {
//!     dataset_path: Some("deutschl/erk".into()),
//!     sequence_length: 64,
//!     ..Default::default()
//! };
//!
//! let output = pipeline::run(&config)?;
//! println!("{} training pairs", output.sequences.len());
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod kern;
pub mod pipeline;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use analysis::{KeyProfile, KeySource};
pub use config::PipelineConfig;
pub use dataset::{TrainingSequences, Vocabulary};
pub use encoding::Token;
pub use error::{ErrorCode, PipelineError, Result};
pub use pipeline::{Inspection, PipelineOutput, PreprocessSummary};
pub use types::{Interval, Key, Mode, Pitch, Score};
