//! Command-line argument parser.
//!
//! Every stage of the pipeline can be run on its own, in order, or all at
//! once with `run`. Flags override values from the config file and the
//! `FOLKSEQ_*` environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::Level;

use crate::analysis::KeyProfile;
use crate::config::PipelineConfig;

/// Available key-finding profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KeyProfileArg {
    /// Aarden-Essen: derived from folk-song melodies
    #[default]
    AardenEssen,
    /// Krumhansl-Kessler: derived from probe-tone ratings
    KrumhanslKessler,
}

impl From<KeyProfileArg> for KeyProfile {
    fn from(arg: KeyProfileArg) -> Self {
        match arg {
            KeyProfileArg::AardenEssen => KeyProfile::AardenEssen,
            KeyProfileArg::KrumhanslKessler => KeyProfile::KrumhanslKessler,
        }
    }
}

/// Pipeline stages.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load, filter, transpose and encode every song into the save directory
    Preprocess,
    /// Join the encoded songs into a single corpus file
    Corpus,
    /// Build the symbol → id mapping from the corpus file
    Mapping,
    /// Build training sequences from the corpus and mapping files
    Sequences,
    /// Run every stage in order
    Run,
    /// Show key, transposition and encoding of a single file
    Inspect {
        /// **kern file to inspect
        file: PathBuf,
    },
}

/// folkseq: folk-song scores to training sequences
#[derive(Parser, Debug)]
#[command(name = "folkseq")]
#[command(about = "Turn **kern folk-song collections into model-ready training sequences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of **kern files to load
    #[arg(short, long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Directory receiving one encoded file per song
    #[arg(long, global = true)]
    pub save_dir: Option<PathBuf>,

    /// Corpus file path
    #[arg(long, global = true)]
    pub corpus_file: Option<PathBuf>,

    /// Mapping JSON file path
    #[arg(long, global = true)]
    pub mapping_file: Option<PathBuf>,

    /// Training window length, also the delimiter count between songs
    #[arg(short = 'l', long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub sequence_length: Option<u32>,

    /// Encoding grid resolution in quarter lengths
    #[arg(short, long, global = true)]
    pub time_step: Option<f64>,

    /// Key-finding profile for songs without a key annotation
    #[arg(short, long, global = true, value_enum)]
    pub key_profile: Option<KeyProfileArg>,

    /// Log and skip unparseable files instead of aborting
    #[arg(long, global = true)]
    pub skip_invalid: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Log level selected by the number of `-v` flags.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::Info,
            1 => Level::Debug,
            _ => Level::Trace,
        }
    }

    /// Applies flags given on the command line on top of `config`.
    pub fn apply_to(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(ref path) = self.dataset {
            config.dataset_path = Some(path.clone());
        }
        if let Some(ref path) = self.save_dir {
            config.save_dir = Some(path.clone());
        }
        if let Some(ref path) = self.corpus_file {
            config.single_file_dataset = Some(path.clone());
        }
        if let Some(ref path) = self.mapping_file {
            config.mapping_path = Some(path.clone());
        }
        if let Some(length) = self.sequence_length {
            config.sequence_length = length as usize;
        }
        if let Some(step) = self.time_step {
            config.time_step = step;
        }
        if let Some(profile) = self.key_profile {
            config.key_profile = profile.into();
        }
        if self.skip_invalid {
            config.skip_invalid = true;
        }
        config
    }
}
