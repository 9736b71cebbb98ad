//! Replacement of non-finite values after normalization.

use crate::data::ExpressionMatrix;
use crate::error::{Result, ZscoreError};
use rayon::prelude::*;
use tracing::debug;

/// Replace every NaN or infinite entry with `value`.
///
/// Rows that are constant or too short to have a standard deviation come out
/// of [`crate::normalize::norm_zscore`] as NaN. Downstream consumers such as
/// cBioPortal expect a number in every cell, and `0.0` (no deviation from the
/// mean) is the usual choice.
///
/// # Returns
/// The number of entries replaced.
pub fn fill_non_finite(matrix: &mut ExpressionMatrix, value: f64) -> Result<usize> {
    if !value.is_finite() {
        return Err(ZscoreError::InvalidParameter(format!(
            "Fill value must be finite, got {}",
            value
        )));
    }

    let n_cols = matrix.n_cols().max(1);
    let replaced: usize = matrix
        .values_mut()
        .par_chunks_mut(n_cols)
        .map(|row| {
            let mut n = 0;
            for v in row.iter_mut().filter(|v| !v.is_finite()) {
                *v = value;
                n += 1;
            }
            n
        })
        .sum();

    debug!("Replaced {} non-finite values with {}", replaced, value);
    Ok(replaced)
}

/// Count NaN or infinite entries.
pub fn count_non_finite(matrix: &ExpressionMatrix) -> usize {
    matrix
        .values()
        .par_chunks(matrix.n_cols().max(1))
        .map(|row| row.iter().filter(|v| !v.is_finite()).count())
        .sum()
}
