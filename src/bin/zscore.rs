//! zscore - expression z-score CLI
//!
//! Command-line interface for row-wise log2 z-scoring of expression matrices.

use cbio_zscore::error::Result;
use cbio_zscore::pipeline::{run_zscore, ZscoreConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Row-wise log2 z-scores for expression matrices
#[derive(Parser)]
#[command(name = "zscore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging for the z-score library
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Z-score a merged expression matrix
    Run {
        /// Path to the expression matrix TSV (Hugo_Symbol x samples)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the z-score TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Job configuration (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Rows to score concurrently (default: 1; values below 1 run as 1)
        #[arg(short, long, allow_negative_numbers = true)]
        threads: Option<i64>,

        /// Replace NaN/inf z-scores with this value
        #[arg(long)]
        fill_non_finite: Option<f64>,

        /// Number of decimals to write
        #[arg(long)]
        precision: Option<usize>,

        /// Samples to write (comma-separated, e.g., "S1,S2,S3")
        #[arg(long, value_delimiter = ',')]
        samples: Option<Vec<String>>,
    },

    /// Generate an example job configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "zscore.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            config,
            threads,
            fill_non_finite,
            precision,
            samples,
        } => cmd_run(
            &input,
            &output,
            config.as_ref(),
            threads,
            fill_non_finite,
            precision,
            samples,
        ),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "info,cbio_zscore=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run a z-score job; command-line values override the config file.
fn cmd_run(
    input_path: &PathBuf,
    output_path: &PathBuf,
    config_path: Option<&PathBuf>,
    threads: Option<i64>,
    fill_non_finite: Option<f64>,
    precision: Option<usize>,
    samples: Option<Vec<String>>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading job configuration from {:?}", path);
            ZscoreConfig::from_file(path)?
        }
        None => ZscoreConfig::default(),
    };
    if let Some(threads) = threads {
        config.threads = threads;
    }
    if fill_non_finite.is_some() {
        config.fill_non_finite = fill_non_finite;
    }
    if precision.is_some() {
        config.precision = precision;
    }
    if samples.is_some() {
        config.samples = samples;
    }

    let summary = run_zscore(&config, input_path, output_path)?;
    info!(
        "Done! {} genes x {} samples written to {:?}",
        summary.n_rows, summary.n_cols, output_path
    );
    Ok(())
}

/// Write an example job configuration.
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = ZscoreConfig {
        name: "example-cohort".to_string(),
        threads: 4,
        fill_non_finite: Some(0.0),
        precision: Some(4),
        samples: None,
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    info!("Wrote example configuration to {:?}", output_path);
    println!("{}", yaml);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_accepts_negative_threads() {
        let cli = Cli::try_parse_from([
            "zscore", "run", "-i", "in.tsv", "-o", "out.tsv", "-t", "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { threads, .. } => assert_eq!(threads, Some(-1)),
            Commands::Example { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_parses_samples_list() {
        let cli = Cli::try_parse_from([
            "zscore", "run", "-i", "in.tsv", "-o", "out.tsv", "--samples", "S1,S2",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { samples, threads, .. } => {
                assert_eq!(samples, Some(vec!["S1".to_string(), "S2".to_string()]));
                assert_eq!(threads, None);
            }
            Commands::Example { .. } => panic!("expected run"),
        }
    }
}
