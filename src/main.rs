//! folkseq: folk-song scores to training sequences.
//!
//! Runs the preprocessing pipeline stage by stage or end to end, and can
//! inspect how a single file would be handled.

use std::path::Path;
use std::time::Instant;

use folkseq::cli::{Cli, Command};
use folkseq::config::PipelineConfig;
use folkseq::dataset::{create_mapping, create_single_file_dataset, load, load_training_sequences};
use folkseq::error::Result;
use folkseq::pipeline::{inspect, preprocess_with_progress, run as run_pipeline};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Err(e) = simple_logger::init_with_level(cli.log_level()) {
        eprintln!("Warning: failed to initialise logging: {}", e);
    }

    let Some(command) = cli.command.clone() else {
        print_usage();
        return Ok(());
    };

    let config = build_config(&cli)?;

    match command {
        Command::Preprocess => run_preprocess(&config),
        Command::Corpus => run_corpus(&config),
        Command::Mapping => run_mapping(&config),
        Command::Sequences => run_sequences(&config),
        Command::Run => run_all(&config),
        Command::Inspect { file } => run_inspect(&file, &config),
    }
}

/// Layers defaults, config file, environment and flags, then validates.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let base = match cli.config {
        Some(ref path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let config = cli.apply_to(base.with_env());
    config.check()?;
    Ok(config)
}

fn run_preprocess(config: &PipelineConfig) -> Result<()> {
    eprintln!("=== folkseq preprocess ===");
    eprintln!("Dataset: {}", config.effective_dataset_path().display());
    eprintln!("Save directory: {}", config.effective_save_dir().display());
    eprintln!("Key profile: {}", config.key_profile);
    eprintln!();

    let start_time = Instant::now();
    let summary = preprocess_with_progress(config, |done, total| {
        if total > 0 && (done % 100 == 0 || done == total) {
            eprint!("\rProcessing: {}/{} songs", done, total);
        }
    })?;
    eprintln!();

    eprintln!();
    eprintln!("Loaded: {}", summary.loaded);
    eprintln!("Kept: {}", summary.kept);
    eprintln!("Rejected (durations): {}", summary.rejected);
    eprintln!("Elapsed: {:.2}s", start_time.elapsed().as_secs_f32());
    Ok(())
}

fn run_corpus(config: &PipelineConfig) -> Result<()> {
    let corpus_path = config.effective_single_file_dataset();
    let corpus = create_single_file_dataset(
        &config.effective_save_dir(),
        &corpus_path,
        config.sequence_length,
    )?;
    eprintln!(
        "Wrote {} symbols to {}",
        corpus.split_whitespace().count(),
        corpus_path.display()
    );
    Ok(())
}

fn run_mapping(config: &PipelineConfig) -> Result<()> {
    let corpus = load(&config.effective_single_file_dataset())?;
    let mapping_path = config.effective_mapping_path();
    let vocabulary = create_mapping(&corpus, &mapping_path)?;
    eprintln!(
        "Wrote mapping of {} symbols to {}",
        vocabulary.len(),
        mapping_path.display()
    );
    Ok(())
}

fn run_sequences(config: &PipelineConfig) -> Result<()> {
    let sequences = load_training_sequences(config)?;
    let (count, length, vocabulary) = sequences.inputs.dim();
    eprintln!("Inputs: ({}, {}, {})", count, length, vocabulary);
    eprintln!("Targets: ({},)", sequences.targets.len());
    Ok(())
}

fn run_all(config: &PipelineConfig) -> Result<()> {
    eprintln!("=== folkseq run ===");
    eprintln!("Dataset: {}", config.effective_dataset_path().display());
    eprintln!("Sequence length: {}", config.sequence_length);
    eprintln!("Time step: {}", config.time_step);
    eprintln!();

    let start_time = Instant::now();
    let output = run_pipeline(config)?;
    let (count, length, vocabulary) = output.sequences.inputs.dim();

    eprintln!("Songs kept: {} of {}", output.preprocess.kept, output.preprocess.loaded);
    eprintln!("Corpus symbols: {}", output.corpus_tokens);
    eprintln!("Vocabulary size: {}", output.vocabulary.len());
    eprintln!("Inputs: ({}, {}, {})", count, length, vocabulary);
    eprintln!("Targets: ({},)", output.sequences.targets.len());
    eprintln!("Elapsed: {:.2}s", start_time.elapsed().as_secs_f32());
    Ok(())
}

fn run_inspect(file: &Path, config: &PipelineConfig) -> Result<()> {
    let report = inspect(file, config)?;

    println!("File: {}", file.display());
    println!("Title: {}", report.title.as_deref().unwrap_or("(none)"));
    println!("Key: {} ({})", report.key, report.key_source.as_str());
    println!("Interval: {}", report.interval);
    match report.rejected_duration {
        Some(duration) => println!("Durations: rejected ({} quarter lengths)", duration),
        None => println!("Durations: acceptable"),
    }
    println!(
        "Original: {}",
        report.original_encoding.as_deref().unwrap_or("(not encodable)")
    );
    println!(
        "Transposed: {}",
        report.transposed_encoding.as_deref().unwrap_or("(not encodable)")
    );
    Ok(())
}

fn print_usage() {
    eprintln!("folkseq: folk-song scores to training sequences");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Full pipeline:");
    eprintln!("    folkseq run --dataset deutschl/erk --sequence-length 64");
    eprintln!();
    eprintln!("  Single stages (in order):");
    eprintln!("    folkseq preprocess --dataset deutschl/erk --save-dir dataset");
    eprintln!("    folkseq corpus");
    eprintln!("    folkseq mapping");
    eprintln!("    folkseq sequences");
    eprintln!();
    eprintln!("  Inspect one file:");
    eprintln!("    folkseq inspect deutschl/erk/deut0567.krn");
    eprintln!();
    eprintln!("Run 'folkseq --help' for full options.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_usage_doesnt_panic() {
        print_usage();
    }
}
