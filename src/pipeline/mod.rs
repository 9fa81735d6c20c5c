//! End-to-end pipeline.
//!
//! Orchestrates loader, filter, transposer, encoder and dataset builders.

pub mod preprocess;
pub mod run;

// Re-export commonly used items
pub use preprocess::{preprocess, preprocess_with_progress, PreprocessSummary};
pub use run::{inspect, run, Inspection, PipelineOutput};
