//! Preprocessing stage: load → filter → transpose → encode → save.

use std::fs;

use log::{debug, info, warn};

use crate::analysis::transpose;
use crate::config::PipelineConfig;
use crate::encoding::{encode_song, first_unacceptable_duration};
use crate::error::{PipelineError, Result};
use crate::kern::load_songs;

/// Counts reported by [`preprocess`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessSummary {
    /// Songs parsed from the dataset directory.
    pub loaded: usize,
    /// Songs encoded and written to the save directory.
    pub kept: usize,
    /// Songs dropped for containing unacceptable durations.
    pub rejected: usize,
}

/// Preprocesses the dataset named by `config`.
///
/// Each surviving song is written to `save_dir/<index>`, where `index` is
/// its position among all loaded songs (so filtered songs leave gaps).
/// `save_dir` is not cleared first; files already in it stay and end up in
/// the corpus, so a warning is logged when it is not empty.
pub fn preprocess(config: &PipelineConfig) -> Result<PreprocessSummary> {
    preprocess_with_progress(config, |_, _| {})
}

/// Preprocesses with a progress callback receiving (songs_done, songs_total).
pub fn preprocess_with_progress<F>(config: &PipelineConfig, on_progress: F) -> Result<PreprocessSummary>
where
    F: Fn(usize, usize),
{
    config.check()?;

    let dataset_path = config.effective_dataset_path();
    info!("loading songs from {}", dataset_path.display());
    let songs = load_songs(&dataset_path, &config.file_extension, config.skip_invalid)?;
    info!("loaded {} songs", songs.len());

    let save_dir = config.effective_save_dir();
    fs::create_dir_all(&save_dir).map_err(|e| PipelineError::io("create directory", &save_dir, e))?;
    let mut existing =
        fs::read_dir(&save_dir).map_err(|e| PipelineError::io("read directory", &save_dir, e))?;
    if existing.next().is_some() {
        warn!(
            "{} is not empty; leftover files will be included in the corpus",
            save_dir.display()
        );
    }

    let total = songs.len();
    let mut summary = PreprocessSummary {
        loaded: total,
        ..Default::default()
    };

    for (index, song) in songs.iter().enumerate() {
        on_progress(index, total);

        if let Some(duration) = first_unacceptable_duration(&song.score, &config.acceptable_durations) {
            debug!(
                "skipping {}: duration {} is not acceptable",
                song.path.display(),
                duration
            );
            summary.rejected += 1;
            continue;
        }

        let transposed =
            transpose(&song.score, config.key_profile).map_err(|e| e.in_file(&song.path))?;
        let encoded =
            encode_song(&transposed, config.time_step).map_err(|e| e.in_file(&song.path))?;

        let out_path = save_dir.join(index.to_string());
        fs::write(&out_path, encoded).map_err(|e| PipelineError::io("write", &out_path, e))?;
        summary.kept += 1;
    }

    on_progress(total, total);
    info!(
        "kept {} of {} songs ({} rejected for durations)",
        summary.kept, summary.loaded, summary.rejected
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::create_single_file_dataset;
    use crate::error::ErrorCode;
    use std::cell::Cell;
    use std::path::Path;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> PipelineConfig {
        PipelineConfig {
            dataset_path: Some(root.join("kern")),
            save_dir: Some(root.join("dataset")),
            single_file_dataset: Some(root.join("file_dataset")),
            mapping_path: Some(root.join("mapping.json")),
            ..Default::default()
        }
    }

    #[test]
    fn writes_surviving_songs_by_index() {
        let dir = tempdir().unwrap();
        let kern = dir.path().join("kern");
        fs::create_dir_all(&kern).unwrap();
        fs::write(kern.join("a.krn"), "**kern\n*G:\n4g\n8a\n8r\n*-\n").unwrap();
        fs::write(kern.join("b.krn"), "**kern\n*C:\n12c\n12d\n12e\n*-\n").unwrap();
        fs::write(kern.join("c.krn"), "**kern\n*a:\n2a\n*-\n").unwrap();

        let config = config_for(dir.path());
        let calls = Cell::new(0);
        let summary = preprocess_with_progress(&config, |_, _| calls.set(calls.get() + 1)).unwrap();

        assert_eq!(
            summary,
            PreprocessSummary {
                loaded: 3,
                kept: 2,
                rejected: 1
            }
        );
        assert_eq!(calls.get(), 4);

        let save_dir = dir.path().join("dataset");
        assert_eq!(fs::read_to_string(save_dir.join("0")).unwrap(), "60 _ _ _ 62 _ r _");
        assert!(!save_dir.join("1").exists());
        assert_eq!(fs::read_to_string(save_dir.join("2")).unwrap(), "69 _ _ _ _ _ _ _");
    }

    #[test]
    fn chord_aborts_with_file_name() {
        let dir = tempdir().unwrap();
        let kern = dir.path().join("kern");
        fs::create_dir_all(&kern).unwrap();
        fs::write(kern.join("poly.krn"), "**kern\n*C:\n4c 4e\n*-\n").unwrap();

        let err = preprocess(&config_for(dir.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedEvent);
        assert!(err.message.contains("poly.krn"));
    }

    #[test]
    fn song_without_events_encodes_empty() {
        let dir = tempdir().unwrap();
        let kern = dir.path().join("kern");
        fs::create_dir_all(&kern).unwrap();
        fs::write(kern.join("a.krn"), "**kern\n*C:\n*-\n").unwrap();
        fs::write(kern.join("b.krn"), "**kern\n*C:\n4c\n*-\n").unwrap();

        let config = PipelineConfig {
            sequence_length: 2,
            ..config_for(dir.path())
        };
        let summary = preprocess(&config).unwrap();
        assert_eq!(summary.kept, 2);

        let save_dir = dir.path().join("dataset");
        assert_eq!(fs::read_to_string(save_dir.join("0")).unwrap(), "");

        let corpus = create_single_file_dataset(&save_dir, &dir.path().join("file_dataset"), 2).unwrap();
        assert_eq!(corpus, " / / 60 _ _ _ / /");
    }

    #[test]
    fn leftover_files_are_kept() {
        let dir = tempdir().unwrap();
        let kern = dir.path().join("kern");
        fs::create_dir_all(&kern).unwrap();
        fs::write(kern.join("a.krn"), "**kern\n*C:\n4c\n*-\n").unwrap();
        let save_dir = dir.path().join("dataset");
        fs::create_dir_all(&save_dir).unwrap();
        fs::write(save_dir.join("7"), "62 _").unwrap();

        preprocess(&config_for(dir.path())).unwrap();
        assert_eq!(fs::read_to_string(save_dir.join("0")).unwrap(), "60 _ _ _");
        assert!(save_dir.join("7").exists());
    }

    #[test]
    fn off_grid_durations_fail_before_writing() {
        let dir = tempdir().unwrap();
        let kern = dir.path().join("kern");
        fs::create_dir_all(&kern).unwrap();
        fs::write(kern.join("a.krn"), "**kern\n*C:\n4c\n*-\n").unwrap();

        let config = PipelineConfig {
            time_step: 0.5,
            ..config_for(dir.path())
        };
        assert_eq!(preprocess(&config).unwrap_err().code, ErrorCode::InvalidConfig);
        assert!(!dir.path().join("dataset").exists());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig {
            sequence_length: 0,
            ..config_for(dir.path())
        };
        assert_eq!(preprocess(&config).unwrap_err().code, ErrorCode::InvalidConfig);
    }
}
