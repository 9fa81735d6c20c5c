//! Training dataset assembly.
//!
//! - [`corpus`]: concatenate encoded songs with delimiters
//! - [`mapping`]: token ⇄ integer vocabulary
//! - [`sequences`]: sliding-window training pairs with one-hot inputs

pub mod corpus;
pub mod mapping;
pub mod sequences;

// Re-export commonly used items
pub use corpus::{build_corpus, create_single_file_dataset, load};
pub use mapping::{convert_songs_to_int, create_mapping, Vocabulary};
pub use sequences::{
    generate_training_sequences, load_training_sequences, one_hot, TrainingSequences,
    DEFAULT_SEQUENCE_LENGTH,
};
