//! End-to-end zdecay runs: generate events into a store, histogram and fit
//! them, and compare the fit with the generating parameters.

#![deny(missing_docs)]

/// YAML run configuration.
pub mod config;
/// Generation, analysis and closure phases.
pub mod pipeline;

pub use config::{AnalysisConfig, FitConfig, HistogramSpec, RunConfig, StoreConfig};
pub use pipeline::{
    analyze, closure_report, fill_histograms, load_run, run_generation, write_json, Analysis,
    AnalysisReport, ClosureReport, GenerationOutcome, HistogramSummary, MANIFEST_FILE,
};
