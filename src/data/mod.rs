//! Data structures for expression z-scoring.

mod expression_matrix;
mod row_view;

pub use expression_matrix::{ExpressionMatrix, TsvFormat, DEFAULT_ROW_HEADER};
pub use row_view::RowView;
