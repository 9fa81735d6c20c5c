//! Humdrum `**kern` input.
//!
//! - [`parse_kern`]: parse one file's contents into a [`Score`](crate::types::Score)
//! - [`load_songs`]: walk a directory tree and parse every matching file

pub mod loader;
pub mod parser;

// Re-export commonly used items
pub use loader::{load_songs, parse_file, walk_files, LoadedSong};
pub use parser::parse_kern;
