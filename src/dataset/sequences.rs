//! Sliding-window training sequences.
//!
//! ```text
//! [11, 12, 13, 14, ...], length 2  ->  input [11, 12] target 13,
//!                                       input [12, 13] target 14, ...
//! ```

use log::info;
use ndarray::{Array1, Array2, Array3};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

use super::corpus::load;
use super::mapping::{convert_songs_to_int, Vocabulary};

/// Default window length, in tokens.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 64;

/// Model-ready training data.
#[derive(Debug, Clone)]
pub struct TrainingSequences {
    /// One-hot inputs, shape `(num_sequences, sequence_length, vocabulary_size)`.
    pub inputs: Array3<f32>,
    /// Next-token IDs, shape `(num_sequences,)`.
    pub targets: Array1<usize>,
}

impl TrainingSequences {
    /// Number of (input, target) pairs.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// One-hot encodes a matrix of class indices into a `(rows, cols, num_classes)` tensor.
pub fn one_hot(indices: &Array2<usize>, num_classes: usize) -> Result<Array3<f32>> {
    let (rows, cols) = indices.dim();
    let mut encoded = Array3::<f32>::zeros((rows, cols, num_classes));
    for ((row, col), &class) in indices.indexed_iter() {
        if class >= num_classes {
            return Err(PipelineError::unknown_token(format!(
                "id {} outside vocabulary of {}",
                class, num_classes
            )));
        }
        encoded[[row, col, class]] = 1.0;
    }
    Ok(encoded)
}

/// Windows of `sequence_length` IDs with stride 1, each paired with the ID
/// that follows it. Produces `len - sequence_length` pairs.
pub fn sliding_windows(int_corpus: &[usize], sequence_length: usize) -> (Array2<usize>, Array1<usize>) {
    let num_sequences = int_corpus.len().saturating_sub(sequence_length);
    let inputs = Array2::from_shape_fn((num_sequences, sequence_length), |(i, j)| int_corpus[i + j]);
    let targets = Array1::from_shape_fn(num_sequences, |i| int_corpus[i + sequence_length]);
    (inputs, targets)
}

/// Builds training pairs from an integer corpus.
pub fn generate_training_sequences(
    int_corpus: &[usize],
    sequence_length: usize,
    vocabulary_size: usize,
) -> Result<TrainingSequences> {
    if sequence_length == 0 {
        return Err(PipelineError::invalid_config("sequence_length must be > 0"));
    }
    let (windows, targets) = sliding_windows(int_corpus, sequence_length);
    let inputs = one_hot(&windows, vocabulary_size)?;
    Ok(TrainingSequences { inputs, targets })
}

/// Loads the corpus and mapping files named by `config` and builds training pairs.
pub fn load_training_sequences(config: &PipelineConfig) -> Result<TrainingSequences> {
    let corpus = load(&config.effective_single_file_dataset())?;
    let vocabulary = Vocabulary::load(&config.effective_mapping_path())?;
    let int_corpus = convert_songs_to_int(&corpus, &vocabulary)?;

    let sequences =
        generate_training_sequences(&int_corpus, config.sequence_length, vocabulary.len())?;
    info!(
        "generated {} training sequences (length {}, vocabulary {})",
        sequences.len(),
        config.sequence_length,
        vocabulary.len()
    );
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s};

    #[test]
    fn windows_and_targets() {
        // vocab {60: 0, "_": 1, "r": 2, 62: 3} over "60 _ r _ 62 _"
        let int_corpus = [0, 1, 2, 1, 3, 1];
        let (inputs, targets) = sliding_windows(&int_corpus, 2);
        assert_eq!(inputs, array![[0usize, 1], [1, 2], [2, 1], [1, 3]]);
        assert_eq!(targets, array![2usize, 1, 3, 1]);
    }

    #[test]
    fn target_follows_window() {
        let int_corpus: Vec<usize> = (0..20).map(|i| i % 7).collect();
        let length = 5;
        let (_, targets) = sliding_windows(&int_corpus, length);
        assert_eq!(targets.len(), int_corpus.len() - length);
        for (i, target) in targets.iter().enumerate() {
            assert_eq!(*target, int_corpus[i + length]);
        }
    }

    #[test]
    fn short_corpus_yields_nothing() {
        let sequences = generate_training_sequences(&[0, 1], 2, 2).unwrap();
        assert!(sequences.is_empty());
        assert_eq!(sequences.inputs.dim(), (0, 2, 2));
    }

    #[test]
    fn one_hot_inputs() {
        let sequences = generate_training_sequences(&[0, 1, 2, 1, 3, 1], 2, 4).unwrap();
        assert_eq!(sequences.inputs.dim(), (4, 2, 4));
        assert_eq!(sequences.inputs.slice(s![0, 0, ..]), array![1.0f32, 0.0, 0.0, 0.0]);
        assert_eq!(sequences.inputs.slice(s![3, 1, ..]), array![0.0f32, 0.0, 0.0, 1.0]);
        // exactly one hot entry per position
        assert_eq!(sequences.inputs.sum(), 8.0);
    }

    #[test]
    fn one_hot_rejects_out_of_range() {
        let indices = array![[0, 5]];
        assert!(one_hot(&indices, 3).is_err());
    }

    #[test]
    fn zero_length_is_invalid() {
        assert!(generate_training_sequences(&[0, 1], 0, 2).is_err());
    }
}
