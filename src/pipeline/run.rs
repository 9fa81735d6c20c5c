//! Full pipeline runs and single-file inspection.

use std::path::Path;

use log::info;

use crate::analysis::{transpose_with_details, KeySource};
use crate::config::PipelineConfig;
use crate::dataset::{
    create_mapping, create_single_file_dataset, load_training_sequences, TrainingSequences,
    Vocabulary,
};
use crate::encoding::{encode_song, first_unacceptable_duration};
use crate::error::Result;
use crate::kern::parse_file;
use crate::types::{Interval, Key};

use super::preprocess::{preprocess, PreprocessSummary};

/// Everything produced by [`run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub preprocess: PreprocessSummary,
    /// Number of whitespace-separated symbols in the corpus file.
    pub corpus_tokens: usize,
    pub vocabulary: Vocabulary,
    pub sequences: TrainingSequences,
}

/// Runs preprocessing, corpus building, mapping and sequence generation.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let summary = preprocess(config)?;

    let corpus = create_single_file_dataset(
        &config.effective_save_dir(),
        &config.effective_single_file_dataset(),
        config.sequence_length,
    )?;
    let corpus_tokens = corpus.split_whitespace().count();

    let vocabulary = create_mapping(&corpus, &config.effective_mapping_path())?;
    info!("vocabulary has {} symbols", vocabulary.len());

    let sequences = load_training_sequences(config)?;
    info!(
        "generated {} training sequences of length {}",
        sequences.len(),
        config.sequence_length
    );

    Ok(PipelineOutput {
        preprocess: summary,
        corpus_tokens,
        vocabulary,
        sequences,
    })
}

/// What the pipeline would do with one file.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub title: Option<String>,
    pub key: Key,
    pub key_source: KeySource,
    /// Interval moving the song to C major or A minor.
    pub interval: Interval,
    /// First duration outside the acceptable set, if any.
    pub rejected_duration: Option<f64>,
    /// Encoding at the original pitch; `None` when the song cannot be encoded.
    pub original_encoding: Option<String>,
    pub transposed_encoding: Option<String>,
}

impl Inspection {
    /// Returns true if preprocessing would keep this song.
    pub fn is_accepted(&self) -> bool {
        self.rejected_duration.is_none() && self.transposed_encoding.is_some()
    }
}

/// Parses one file and reports its key, transposition and encodings.
///
/// Fails only when the file cannot be read, parsed or assigned a key;
/// encoding problems are reported as missing encodings.
pub fn inspect(path: &Path, config: &PipelineConfig) -> Result<Inspection> {
    let score = parse_file(path)?;
    let transposition =
        transpose_with_details(&score, config.key_profile).map_err(|e| e.in_file(path))?;

    Ok(Inspection {
        title: score.title().map(str::to_string),
        key: transposition.key,
        key_source: transposition.source,
        interval: transposition.interval,
        rejected_duration: first_unacceptable_duration(&score, &config.acceptable_durations),
        original_encoding: encode_song(&score, config.time_step).ok(),
        transposed_encoding: encode_song(&transposition.score, config.time_step).ok(),
    })
}
