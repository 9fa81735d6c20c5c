//! Single-file corpus assembly.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::encoding::DELIMITER_SYMBOL;
use crate::error::{PipelineError, Result};
use crate::kern::walk_files;

/// Reads a text file.
pub fn load(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PipelineError::io("read", path, e))
}

/// Concatenates encoded songs, following each with `sequence_length`
/// delimiter tokens so that no training window spans two songs without
/// seeing a boundary. The final trailing space is dropped.
pub fn build_corpus<S: AsRef<str>>(songs: &[S], sequence_length: usize) -> String {
    let delimiter = format!("{} ", DELIMITER_SYMBOL).repeat(sequence_length);
    let mut corpus = String::new();
    for song in songs {
        corpus.push_str(song.as_ref());
        corpus.push(' ');
        corpus.push_str(&delimiter);
    }
    corpus.pop();
    corpus
}

/// Orders per-song files: numeric names by value, then the rest by path.
fn song_order(files: &mut [PathBuf]) {
    files.sort_by_key(|path| {
        let index = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse::<u64>().ok());
        (index.is_none(), index, path.clone())
    });
}

/// Reads every encoded song below `dataset_dir`, assembles the corpus, and
/// writes it to `file_dataset_path`.
pub fn create_single_file_dataset(
    dataset_dir: &Path,
    file_dataset_path: &Path,
    sequence_length: usize,
) -> Result<String> {
    let mut files = walk_files(dataset_dir)?;
    song_order(&mut files);

    let songs = files
        .iter()
        .map(|path| load(path))
        .collect::<Result<Vec<_>>>()?;
    let corpus = build_corpus(&songs, sequence_length);

    if let Some(parent) = file_dataset_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| PipelineError::io("create directory", parent, e))?;
        }
    }
    fs::write(file_dataset_path, &corpus)
        .map_err(|e| PipelineError::io("write", file_dataset_path, e))?;

    info!(
        "wrote corpus of {} songs to {}",
        songs.len(),
        file_dataset_path.display()
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_song_keeps_leading_space() {
        assert_eq!(build_corpus(&["", "60 _"], 2), " / / 60 _ / /");
    }

    #[test]
    fn delimiters_follow_every_song() {
        let corpus = build_corpus(&["60 _ r", "62 _"], 2);
        assert_eq!(corpus, "60 _ r / / 62 _ / /");
    }

    #[test]
    fn empty_corpus() {
        let songs: [&str; 0] = [];
        assert_eq!(build_corpus(&songs, 64), "");
    }

    #[test]
    fn delimiter_count_matches_sequence_length() {
        let corpus = build_corpus(&["60"], 64);
        assert_eq!(corpus.split(' ').filter(|t| *t == "/").count(), 64);
        assert!(!corpus.ends_with(' '));
    }

    #[test]
    fn numeric_file_order() {
        let dir = tempdir().unwrap();
        let songs = dir.path().join("songs");
        fs::create_dir_all(&songs).unwrap();
        fs::write(songs.join("10"), "64").unwrap();
        fs::write(songs.join("2"), "62").unwrap();
        fs::write(songs.join("0"), "60").unwrap();

        let out = dir.path().join("out/corpus");
        let corpus = create_single_file_dataset(&songs, &out, 1).unwrap();
        assert_eq!(corpus, "60 / 62 / 64 /");
        assert_eq!(load(&out).unwrap(), corpus);
    }
}
