//! Log2 z-score transformation of a single row.
//!
//! A row is transformed in place in three passes:
//!
//! 1. every non-zero value `v` becomes `log2(v + 1)` and the mean is taken
//! 2. the sample standard deviation (n - 1 denominator) around that mean
//! 3. every value becomes `(v - mean) / sd`, rounded up to 4 decimals
//!
//! # Degenerate rows
//!
//! Rows must hold at least two values and must not be constant after the log
//! transform. A single-value row divides by `n - 1 = 0` and a constant row
//! divides by `sd = 0`; in both cases every output is NaN. This is left as is
//! so that callers can tell degenerate rows apart from rows whose z-scores are
//! genuinely zero. Use [`crate::zero::fill_non_finite`] to replace them.

/// Scale used for rounding z-scores (4 decimal digits).
pub const ROUND_SCALE: f64 = 10_000.0;

/// Replace every non-zero value with `log2(v + 1)` and return the row mean.
///
/// Exact zeros are skipped; they still count towards the mean. The mean is
/// accumulated relative to the first transformed value, so a constant row
/// yields exactly that value and its deviations are exactly zero.
pub fn log2_shift(row: &mut [f64]) -> f64 {
    let mut shift = None;
    let mut sum = 0.0;
    for v in row.iter_mut() {
        if *v != 0.0 {
            *v = (*v + 1.0).log2();
        }
        let x0 = *shift.get_or_insert(*v);
        sum += *v - x0;
    }
    shift.unwrap_or(0.0) + sum / row.len() as f64
}

/// Sample standard deviation of `row` around `mean`.
pub fn sample_sd(row: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = row.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (row.len() as f64 - 1.0)).sqrt()
}

/// Round towards positive infinity at 4 decimal digits.
#[inline]
pub fn round_up(z: f64) -> f64 {
    (z * ROUND_SCALE).ceil() / ROUND_SCALE
}

/// Transform a row of raw values into rounded log2 z-scores, in place.
pub fn zscore_row(row: &mut [f64]) {
    let mean = log2_shift(row);
    let sd = sample_sd(row, mean);
    for v in row.iter_mut() {
        *v = round_up((*v - mean) / sd);
    }
}
