//! Pipeline configuration module.
//!
//! Contains the paths and parameters every pipeline stage reads. Values come
//! from defaults, an optional JSON file, `FOLKSEQ_*` environment variables and
//! finally command-line flags, each layer overriding the previous one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::KeyProfile;
use crate::dataset::DEFAULT_SEQUENCE_LENGTH;
use crate::encoding::{fits_grid, ACCEPTABLE_DURATIONS, DEFAULT_TIME_STEP};
use crate::error::{ErrorCode, PipelineError, Result};

/// Default extension of notation files.
pub const DEFAULT_FILE_EXTENSION: &str = "krn";

/// Runtime configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory tree containing the input notation files.
    /// If None, uses the platform-specific default data location.
    pub dataset_path: Option<PathBuf>,

    /// Directory receiving one encoded file per surviving song.
    /// If None, uses the platform-specific default data location.
    pub save_dir: Option<PathBuf>,

    /// File receiving the concatenated corpus.
    /// If None, uses the platform-specific default data location.
    pub single_file_dataset: Option<PathBuf>,

    /// JSON file receiving the token → id mapping.
    /// If None, uses the platform-specific default data location.
    pub mapping_path: Option<PathBuf>,

    /// Extension (without dot) of the notation files to load.
    pub file_extension: String,

    /// Training window length; also the number of delimiters between songs.
    pub sequence_length: usize,

    /// Encoding grid resolution in quarter lengths.
    pub time_step: f64,

    /// Quarter-length durations a song may contain.
    pub acceptable_durations: Vec<f64>,

    /// Weightings used when a song has no key annotation.
    pub key_profile: KeyProfile,

    /// Log and skip unparseable files instead of aborting.
    pub skip_invalid: bool,
}

impl PipelineConfig {
    /// Creates a new PipelineConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io("read", path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            PipelineError::with_source(
                ErrorCode::InvalidConfig,
                format!("Failed to parse config file {}", path.display()),
                e,
            )
        })
    }

    /// Creates a PipelineConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `FOLKSEQ_DATASET_PATH` - Directory of notation files
    /// - `FOLKSEQ_SAVE_DIR` - Directory for per-song encodings
    /// - `FOLKSEQ_SINGLE_FILE_DATASET` - Corpus file
    /// - `FOLKSEQ_MAPPING_PATH` - Mapping JSON file
    /// - `FOLKSEQ_SEQUENCE_LENGTH` - Training window length
    /// - `FOLKSEQ_TIME_STEP` - Encoding grid resolution
    /// - `FOLKSEQ_KEY_PROFILE` - Key-finding profile (aarden_essen, krumhansl_kessler)
    ///
    /// Falls back to defaults for unset variables.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Applies `FOLKSEQ_*` environment overrides on top of this configuration.
    pub fn with_env(mut self) -> Self {
        if let Ok(path) = std::env::var("FOLKSEQ_DATASET_PATH") {
            self.dataset_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("FOLKSEQ_SAVE_DIR") {
            self.save_dir = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("FOLKSEQ_SINGLE_FILE_DATASET") {
            self.single_file_dataset = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("FOLKSEQ_MAPPING_PATH") {
            self.mapping_path = Some(PathBuf::from(path));
        }

        if let Ok(length_str) = std::env::var("FOLKSEQ_SEQUENCE_LENGTH") {
            if let Ok(length) = length_str.parse::<usize>() {
                if length > 0 {
                    self.sequence_length = length;
                }
            }
        }

        if let Ok(step_str) = std::env::var("FOLKSEQ_TIME_STEP") {
            if let Ok(step) = step_str.parse::<f64>() {
                if step.is_finite() && step > 0.0 {
                    self.time_step = step;
                }
            }
        }

        if let Ok(profile_str) = std::env::var("FOLKSEQ_KEY_PROFILE") {
            if let Some(profile) = KeyProfile::parse(&profile_str) {
                self.key_profile = profile;
            }
        }

        self
    }

    /// Returns the effective input directory, using platform defaults if not specified.
    pub fn effective_dataset_path(&self) -> PathBuf {
        self.dataset_path
            .clone()
            .unwrap_or_else(|| default_data_path("kern"))
    }

    /// Returns the effective per-song output directory.
    pub fn effective_save_dir(&self) -> PathBuf {
        self.save_dir
            .clone()
            .unwrap_or_else(|| default_data_path("dataset"))
    }

    /// Returns the effective corpus file path.
    pub fn effective_single_file_dataset(&self) -> PathBuf {
        self.single_file_dataset
            .clone()
            .unwrap_or_else(|| default_data_path("file_dataset"))
    }

    /// Returns the effective mapping file path.
    pub fn effective_mapping_path(&self) -> PathBuf {
        self.mapping_path
            .clone()
            .unwrap_or_else(|| default_data_path("mapping.json"))
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.sequence_length == 0 {
            return Some("sequence_length must be > 0".to_string());
        }

        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Some(format!(
                "time_step must be positive, got {}",
                self.time_step
            ));
        }

        if self.acceptable_durations.is_empty() {
            return Some("acceptable_durations cannot be empty".to_string());
        }

        if let Some(bad) = self
            .acceptable_durations
            .iter()
            .find(|d| !d.is_finite() || **d <= 0.0)
        {
            return Some(format!("acceptable duration must be positive, got {}", bad));
        }

        if let Some(bad) = self
            .acceptable_durations
            .iter()
            .find(|d| !fits_grid(**d, self.time_step))
        {
            return Some(format!(
                "acceptable duration {} is not a multiple of time_step {}",
                bad, self.time_step
            ));
        }

        if self.file_extension.is_empty() || self.file_extension.starts_with('.') {
            return Some(format!(
                "file_extension must be non-empty and without a leading dot, got {:?}",
                self.file_extension
            ));
        }

        None
    }

    /// Like [`validate`](Self::validate), as a `Result`.
    pub fn check(&self) -> Result<()> {
        match self.validate() {
            Some(reason) => Err(PipelineError::invalid_config(reason)),
            None => Ok(()),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            save_dir: None,
            single_file_dataset: None,
            mapping_path: None,
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            time_step: DEFAULT_TIME_STEP,
            acceptable_durations: ACCEPTABLE_DURATIONS.to_vec(),
            key_profile: KeyProfile::default(),
            skip_invalid: false,
        }
    }
}

/// Returns a path below the platform-specific data directory.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Application Support/folkseq/<name>
/// - Linux: ~/.local/share/folkseq/<name>
/// - Windows: C:\Users\<user>\AppData\Roaming\folkseq\data\<name>
fn default_data_path(name: &str) -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "folkseq") {
        proj_dirs.data_dir().join(name)
    } else {
        // Fallback to current directory
        PathBuf::from(".").join(name)
    }
}
