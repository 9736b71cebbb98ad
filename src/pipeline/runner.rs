//! Job configuration and the read → normalize → write runner.

use crate::data::{ExpressionMatrix, TsvFormat};
use crate::error::{Result, ZscoreError};
use crate::normalize::{norm_zscore, ScorerConfig};
use crate::zero::{count_non_finite, fill_non_finite};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Serializable description of a z-score job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZscoreConfig {
    /// Name of the job, used in logs.
    pub name: String,
    /// Rows scored concurrently per batch. Zero and negative counts run as 1.
    pub threads: i64,
    /// Replace NaN/inf z-scores with this value before writing.
    pub fill_non_finite: Option<f64>,
    /// Fixed number of decimals in the output; `None` writes exact values.
    pub precision: Option<usize>,
    /// Samples to write, in order. Z-scores are still computed over all samples.
    pub samples: Option<Vec<String>>,
}

impl Default for ZscoreConfig {
    fn default() -> Self {
        Self {
            name: "zscore".to_string(),
            threads: 1,
            fill_non_finite: None,
            precision: None,
            samples: None,
        }
    }
}

impl ZscoreConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ZscoreError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ZscoreError::from)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ZscoreError::from)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Scorer settings for this job.
    pub fn scorer(&self) -> ScorerConfig {
        let threads = usize::try_from(self.threads.max(1)).unwrap_or(usize::MAX);
        ScorerConfig::new(threads)
    }

    /// Output format for this job.
    pub fn tsv_format(&self) -> TsvFormat {
        TsvFormat {
            precision: self.precision,
            ..TsvFormat::default()
        }
    }
}

/// Outcome of a z-score job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rows (genes) written.
    pub n_rows: usize,
    /// Columns (samples) written.
    pub n_cols: usize,
    /// Thread count used after coercion.
    pub threads: usize,
    /// Non-finite z-scores produced by normalization.
    pub non_finite: usize,
    /// Non-finite z-scores replaced by the fill value.
    pub filled: usize,
}

/// Normalize a matrix in memory according to `config`.
///
/// Returns the matrix to write (subset to `config.samples` if set) together
/// with the run summary.
pub fn apply_zscore(
    mut matrix: ExpressionMatrix,
    config: &ZscoreConfig,
) -> Result<(ExpressionMatrix, RunSummary)> {
    let batches = norm_zscore(&mut matrix, &config.scorer());
    let non_finite = count_non_finite(&matrix);

    let filled = match config.fill_non_finite {
        Some(value) => fill_non_finite(&mut matrix, value)?,
        None => 0,
    };

    let matrix = match &config.samples {
        Some(samples) => matrix.subset_samples(samples)?,
        None => matrix,
    };

    let summary = RunSummary {
        n_rows: matrix.n_rows(),
        n_cols: matrix.n_cols(),
        threads: batches.threads,
        non_finite,
        filled,
    };
    Ok((matrix, summary))
}

/// Read `input`, z-score it and write the result to `output`.
pub fn run_zscore<P: AsRef<Path>, Q: AsRef<Path>>(
    config: &ZscoreConfig,
    input: P,
    output: Q,
) -> Result<RunSummary> {
    info!("Running z-score job '{}'", config.name);
    let matrix = ExpressionMatrix::from_tsv(input)?;
    let (scored, summary) = apply_zscore(matrix, config)?;
    scored.to_tsv_with(output, &config.tsv_format())?;

    if summary.non_finite > 0 {
        info!(
            "{} non-finite z-scores ({} replaced)",
            summary.non_finite, summary.filled
        );
    }
    Ok(summary)
}
