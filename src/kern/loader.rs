//! Directory loader for notation files.
//!
//! Walks a dataset tree and parses every file with the configured extension.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::types::Score;

use super::parser::parse_kern;

/// A parsed song together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedSong {
    pub path: PathBuf,
    pub score: Score,
}

/// Returns every file below `root`, sorted by path.
///
/// Directory symlinks are listed as files rather than descended into.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| PipelineError::io("read directory", &dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io("read directory", &dir, e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| PipelineError::io("read file type", &path, e))?;
            // Symlinked directories are not followed.
            if file_type.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Reads and parses a single notation file.
///
/// Files are decoded lossily; older collections are often Latin-1 encoded
/// and only their comments contain non-ASCII text.
pub fn parse_file(path: &Path) -> Result<Score> {
    let bytes = fs::read(path).map_err(|e| PipelineError::io("read", path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    parse_kern(&text).map_err(|e| e.in_file(path))
}

/// Loads every file ending in `extension` below `root`.
///
/// A file that fails to parse aborts the load unless `skip_invalid` is set,
/// in which case it is logged and skipped.
pub fn load_songs(root: &Path, extension: &str, skip_invalid: bool) -> Result<Vec<LoadedSong>> {
    let mut songs = Vec::new();

    for path in walk_files(root)? {
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }

        match parse_file(&path) {
            Ok(score) => {
                debug!("parsed {}", path.display());
                songs.push(LoadedSong { path, score });
            }
            Err(e) if skip_invalid => {
                warn!("skipping invalid song file: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    const VALID: &str = "**kern\n*C:\n4c\n4d\n*-\n";

    #[cfg(unix)]
    #[test]
    fn walk_files_does_not_follow_directory_links() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("songs")).unwrap();
        fs::write(dir.path().join("songs/a.krn"), VALID).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("songs/loop")).unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("songs/a.krn"), dir.path().join("songs/loop")]
        );

        let songs = load_songs(dir.path(), "krn", false).unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[test]
    fn walk_files_recurses_and_sorts() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/inner")).unwrap();
        fs::write(dir.path().join("b/inner/z.krn"), VALID).unwrap();
        fs::write(dir.path().join("a.krn"), VALID).unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.krn"),
                PathBuf::from("b/inner/z.krn"),
                PathBuf::from("c.txt"),
            ]
        );
    }

    #[test]
    fn load_songs_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.krn"), VALID).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a song").unwrap();

        let songs = load_songs(dir.path(), "krn", false).unwrap();
        assert_eq!(songs.len(), 1);
        assert!(songs[0].path.ends_with("one.krn"));
    }

    #[test]
    fn invalid_file_fails_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.krn"), "4c\n").unwrap();

        let err = load_songs(dir.path(), "krn", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseFailed);
        assert!(err.message.contains("bad.krn"));
    }

    #[test]
    fn invalid_file_skipped_when_requested() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.krn"), "4c\n").unwrap();
        fs::write(dir.path().join("good.krn"), VALID).unwrap();

        let songs = load_songs(dir.path(), "krn", true).unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[test]
    fn latin1_comments_are_tolerated() {
        let dir = tempdir().unwrap();
        let mut bytes = b"!!!OTL: M\xe4dchen\n".to_vec();
        bytes.extend_from_slice(VALID.as_bytes());
        let path = dir.path().join("song.krn");
        fs::write(&path, bytes).unwrap();

        let score = parse_file(&path).unwrap();
        assert!(score.title().unwrap().starts_with('M'));
    }
}
