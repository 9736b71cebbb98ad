//! Expression Z-Score Library
//!
//! Row-wise log2 z-score normalization of dense expression matrices, as
//! used to prepare mRNA expression z-score files for cBioPortal.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (ExpressionMatrix, RowView, TSV I/O)
//! - **normalize**: Per-row log2 z-scores and the batched parallel scorer
//! - **zero**: Optional replacement of non-finite z-scores
//! - **pipeline**: Job configuration and execution
//!
//! # Example
//!
//! ```no_run
//! use cbio_zscore::prelude::*;
//!
//! let mut matrix = ExpressionMatrix::from_tsv("rsem_merged.tsv").unwrap();
//! norm_zscore(&mut matrix, &ScorerConfig::new(4));
//! matrix.to_tsv("rsem_merged_zscore.tsv").unwrap();
//! ```

pub mod data;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod zero;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{ExpressionMatrix, RowView, TsvFormat, DEFAULT_ROW_HEADER};
    pub use crate::error::{Result, ZscoreError};
    pub use crate::normalize::{
        for_each_row_batched, into_zscores, norm_zscore, zscore_row, BatchSummary, ScorerConfig,
    };
    pub use crate::pipeline::{apply_zscore, run_zscore, RunSummary, ZscoreConfig};
    pub use crate::zero::{count_non_finite, fill_non_finite};
}
