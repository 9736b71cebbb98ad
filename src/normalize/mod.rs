//! Row-wise log2 z-score normalization.
//!
//! - **row**: the per-row transform (log2 shift, sample SD, rounded z-score)
//! - **parallel**: batched, thread-scoped application of the row transform
//!   to every row of an [`ExpressionMatrix`](crate::data::ExpressionMatrix)

pub mod parallel;
pub mod row;

pub use parallel::{for_each_row_batched, into_zscores, norm_zscore, BatchSummary, ScorerConfig};
pub use row::{log2_shift, round_up, sample_sd, zscore_row, ROUND_SCALE};
