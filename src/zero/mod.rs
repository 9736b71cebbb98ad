//! Handling of non-finite z-scores left by degenerate rows.

pub mod fill;

pub use fill::{count_non_finite, fill_non_finite};
