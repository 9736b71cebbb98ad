//! Row-parallel z-scoring of a whole matrix.
//!
//! Rows are processed in batches of `threads` rows starting at row 0. Each
//! row of a full batch runs on its own scoped thread and the whole batch is
//! joined before the next one starts, so at most `threads` rows are ever in
//! flight. The trailing rows that do not fill a batch are scored one after
//! another on the calling thread.

use super::row::zscore_row;
use crate::data::{ExpressionMatrix, RowView};
use std::panic;
use std::thread;
use tracing::{debug, info};

/// Call-boundary configuration of the row scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorerConfig {
    /// Rows scored concurrently per batch. Values below 1 are treated as 1.
    pub threads: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl ScorerConfig {
    /// Create a config for the given thread count.
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }

    /// Thread count actually used, never less than 1.
    #[inline]
    pub fn effective_threads(&self) -> usize {
        self.threads.max(1)
    }
}

/// How the rows of a matrix were scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Thread count after coercion.
    pub threads: usize,
    /// Number of full batches run on scoped threads.
    pub concurrent_batches: usize,
    /// Number of remainder rows scored on the calling thread.
    pub sequential_rows: usize,
}

/// Replace every row of `matrix` with its rounded log2 z-scores.
///
/// Labels and dimensions are left untouched. Results do not depend on the
/// thread count.
pub fn norm_zscore(matrix: &mut ExpressionMatrix, config: &ScorerConfig) -> BatchSummary {
    info!(
        "Utilizing {} threads to compute z-scores",
        config.effective_threads()
    );
    for_each_row_batched(matrix, config.effective_threads(), |mut row| {
        zscore_row(&mut row)
    })
}

/// Owning variant of [`norm_zscore`]: takes the matrix and hands it back scored.
pub fn into_zscores(mut matrix: ExpressionMatrix, config: &ScorerConfig) -> ExpressionMatrix {
    norm_zscore(&mut matrix, config);
    matrix
}

/// Run `f` on every row using the batch schedule described in the module docs.
///
/// Every row is passed to `f` exactly once. All spawned threads are joined
/// before this returns; a panic in `f` is re-raised here once its batch has
/// been joined.
pub fn for_each_row_batched<F>(matrix: &mut ExpressionMatrix, threads: usize, f: F) -> BatchSummary
where
    F: Fn(RowView<'_>) + Sync,
{
    let threads = threads.max(1);
    let f = &f;
    let mut summary = BatchSummary {
        threads,
        ..BatchSummary::default()
    };

    let mut rows = matrix.rows_mut();
    loop {
        let batch: Vec<RowView<'_>> = rows.by_ref().take(threads).collect();
        let Some(first) = batch.first() else {
            break;
        };
        let start = first.index();

        if batch.len() < threads {
            debug!(start, size = batch.len(), "scoring remainder rows sequentially");
            summary.sequential_rows += batch.len();
            for row in batch {
                f(row);
            }
            break;
        }

        debug!(start, size = batch.len(), "scoring batch concurrently");
        thread::scope(|s| {
            let handles: Vec<_> = batch
                .into_iter()
                .map(|row| s.spawn(move || f(row)))
                .collect();
            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic::resume_unwind(payload);
                }
            }
        });
        summary.concurrent_batches += 1;
    }

    summary
}
