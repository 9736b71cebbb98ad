//! Mutable window over a single matrix row.

use std::ops::{Deref, DerefMut};

/// A non-owning, mutable view of one row of an [`ExpressionMatrix`].
///
/// Views are only handed out by [`ExpressionMatrix::rows_mut`], which splits
/// the row-major buffer into disjoint slices. Two views can never overlap, so
/// each one can be moved to its own thread without locking.
///
/// [`ExpressionMatrix`]: super::ExpressionMatrix
/// [`ExpressionMatrix::rows_mut`]: super::ExpressionMatrix::rows_mut
#[derive(Debug)]
pub struct RowView<'a> {
    index: usize,
    values: &'a mut [f64],
}

impl<'a> RowView<'a> {
    pub(crate) fn new(index: usize, values: &'a mut [f64]) -> Self {
        Self { index, values }
    }

    /// Row index within the parent matrix.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Address range covered by this view, used to check disjointness.
    pub fn span(&self) -> std::ops::Range<usize> {
        let start = self.values.as_ptr() as usize;
        start..start + self.values.len() * std::mem::size_of::<f64>()
    }
}

impl Deref for RowView<'_> {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &*self.values
    }
}

impl DerefMut for RowView<'_> {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut *self.values
    }
}
