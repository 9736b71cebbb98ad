//! Pipeline configuration and execution.

pub mod runner;

pub use runner::{apply_zscore, run_zscore, RunSummary, ZscoreConfig};
