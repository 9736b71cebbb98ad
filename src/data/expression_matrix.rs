//! Dense expression matrix with gene and sample labels.

use super::RowView;
use crate::error::{Result, ZscoreError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header token written in front of the sample labels.
pub const DEFAULT_ROW_HEADER: &str = "Hugo_Symbol";

/// A dense matrix of expression values.
///
/// Rows represent genes, columns represent samples. Values are stored
/// row-major so that every row is one contiguous slice, which is what the
/// row-wise normalization works on.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    /// Row-major values (rows × cols)
    values: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
    /// Gene identifiers (row names)
    row_ids: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
}

/// Output options for writing a matrix as TSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvFormat {
    /// Label of the row-name column in the header line.
    pub row_header: String,
    /// Fixed number of decimals; `None` writes the shortest exact form.
    pub precision: Option<usize>,
}

impl Default for TsvFormat {
    fn default() -> Self {
        Self {
            row_header: DEFAULT_ROW_HEADER.to_string(),
            precision: None,
        }
    }
}

impl TsvFormat {
    /// Default format with a fixed number of decimals.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            precision: Some(precision),
            ..Self::default()
        }
    }
}

impl ExpressionMatrix {
    /// Create a new matrix from row-major values and identifiers.
    pub fn new(
        values: Vec<f64>,
        n_rows: usize,
        n_cols: usize,
        row_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        if values.len() != n_rows * n_cols {
            return Err(ZscoreError::DimensionMismatch {
                expected: n_rows * n_cols,
                actual: values.len(),
            });
        }
        if n_rows != row_ids.len() {
            return Err(ZscoreError::DimensionMismatch {
                expected: n_rows,
                actual: row_ids.len(),
            });
        }
        if n_cols != sample_ids.len() {
            return Err(ZscoreError::DimensionMismatch {
                expected: n_cols,
                actual: sample_ids.len(),
            });
        }
        Ok(Self {
            values,
            n_rows,
            n_cols,
            row_ids,
            sample_ids,
        })
    }

    /// Create from a vector of rows. All rows must have one value per sample.
    pub fn from_rows(
        rows: Vec<Vec<f64>>,
        row_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = sample_ids.len();
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(ZscoreError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            values.extend(row);
        }
        Self::new(values, n_rows, n_cols, row_ids, sample_ids)
    }

    /// Load an expression matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the gene ID header,
    ///   usually `Hugo_Symbol`)
    /// - Subsequent rows: gene ID followed by one value per sample
    ///
    /// Empty cells and `NA` are read as NaN.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // Parse header
        let header_line = lines
            .next()
            .ok_or_else(|| ZscoreError::EmptyData("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.trim_end_matches('\r').split('\t').collect();
        if header.len() < 2 {
            return Err(ZscoreError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let sample_ids: Vec<String> = header[1..].iter().map(|s| s.to_string()).collect();
        let n_samples = sample_ids.len();

        let mut values: Vec<f64> = Vec::new();
        let mut row_ids: Vec<String> = Vec::new();

        for line_result in lines {
            let line = line_result?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let row_idx = row_ids.len();
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != n_samples + 1 {
                return Err(ZscoreError::DimensionMismatch {
                    expected: n_samples + 1,
                    actual: fields.len(),
                });
            }

            row_ids.push(fields[0].to_string());
            for (col_idx, value_str) in fields[1..].iter().enumerate() {
                values.push(parse_value(value_str, row_idx, col_idx)?);
            }
        }

        let n_rows = row_ids.len();
        if n_rows == 0 {
            return Err(ZscoreError::EmptyData("No rows in TSV".to_string()));
        }

        info!(
            "Read {} rows x {} samples from {}",
            n_rows,
            n_samples,
            path.display()
        );
        Self::new(values, n_rows, n_samples, row_ids, sample_ids)
    }

    /// Write the matrix to a TSV file with a `Hugo_Symbol` header.
    ///
    /// Values use the shortest decimal form that reads back exactly, so raw
    /// integer counts are written without a fractional part.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_tsv_with(path, &TsvFormat::default())
    }

    /// Write the matrix to a TSV file using the given format.
    pub fn to_tsv_with<P: AsRef<Path>>(&self, path: P, format: &TsvFormat) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer, format)?;
        writer.flush()?;
        info!(
            "Wrote {} rows x {} samples to {}",
            self.n_rows,
            self.n_cols,
            path.display()
        );
        Ok(())
    }

    /// Write the matrix as TSV to any writer.
    ///
    /// No tab is written after the last field of a line.
    pub fn write_tsv<W: Write>(&self, writer: &mut W, format: &TsvFormat) -> Result<()> {
        // Write header
        write!(writer, "{}", format.row_header)?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        // Write data rows
        for (row_idx, row_id) in self.row_ids.iter().enumerate() {
            write!(writer, "{}", row_id)?;
            for &value in self.row(row_idx) {
                match format.precision {
                    Some(p) => write!(writer, "\t{:.*}", p, value)?,
                    None => write!(writer, "\t{}", value)?,
                }
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Get the value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols + col]
    }

    /// Number of rows (genes).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (samples).
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Gene identifiers.
    #[inline]
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// All values in row-major order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Values of a single row.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_cols;
        &self.values[start..start + self.n_cols]
    }

    /// Split the matrix into disjoint mutable row views, in row order.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = RowView<'_>> + '_ {
        let n_cols = self.n_cols;
        let n_rows = self.n_rows;
        let mut rest: &mut [f64] = &mut self.values;
        (0..n_rows).map(move |index| {
            let (row, tail) = std::mem::take(&mut rest).split_at_mut(n_cols);
            rest = tail;
            RowView::new(index, row)
        })
    }

    /// Subset the matrix to the named samples, in the order given.
    pub fn subset_samples(&self, samples: &[String]) -> Result<Self> {
        let col_map: HashMap<&str, usize> = self
            .sample_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();

        let indices = samples
            .iter()
            .map(|s| {
                col_map
                    .get(s.as_str())
                    .copied()
                    .ok_or_else(|| ZscoreError::UnknownSample(s.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut values = Vec::with_capacity(self.n_rows * indices.len());
        for row in 0..self.n_rows {
            let src = self.row(row);
            values.extend(indices.iter().map(|&col| src[col]));
        }

        Self::new(
            values,
            self.n_rows,
            indices.len(),
            self.row_ids.clone(),
            samples.to_vec(),
        )
    }

    /// Convert to a nalgebra dense matrix.
    pub fn to_dense(&self) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_row_slice(self.n_rows, self.n_cols, &self.values)
    }

    /// Create from a nalgebra dense matrix.
    pub fn from_dense(
        data: &nalgebra::DMatrix<f64>,
        row_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        let mut values = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            for col in 0..ncols {
                values.push(data[(row, col)]);
            }
        }
        Self::new(values, nrows, ncols, row_ids, sample_ids)
    }
}

fn parse_value(raw: &str, row: usize, col: usize) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        return Ok(f64::NAN);
    }
    trimmed.parse().map_err(|_| ZscoreError::InvalidValue {
        value: raw.to_string(),
        row,
        col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_matrix() -> ExpressionMatrix {
        // 3 genes × 4 samples
        let rows = vec![
            vec![10.0, 20.0, 0.0, 5.0],
            vec![100.0, 200.0, 150.0, 175.0],
            vec![1.0, 0.0, 0.0, 0.0],
        ];
        let row_ids = vec!["TP53".to_string(), "EGFR".to_string(), "KRAS".to_string()];
        let sample_ids = vec![
            "sample1".to_string(),
            "sample2".to_string(),
            "sample3".to_string(),
            "sample4".to_string(),
        ];
        ExpressionMatrix::from_rows(rows, row_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_rows(), 3);
        assert_eq!(mat.n_cols(), 4);
        assert_eq!(mat.values().len(), 12);
    }

    #[test]
    fn test_get_values() {
        let mat = create_test_matrix();
        assert_eq!(mat.get(0, 0), 10.0);
        assert_eq!(mat.get(0, 2), 0.0);
        assert_eq!(mat.get(1, 3), 175.0);
        assert_eq!(mat.row(2), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        let err = ExpressionMatrix::new(vec![1.0; 5], 2, 3, vec!["a".into(), "b".into()], vec![
            "x".into(),
            "y".into(),
            "z".into(),
        ]);
        assert!(matches!(
            err,
            Err(ZscoreError::DimensionMismatch { expected: 6, actual: 5 })
        ));

        let err = ExpressionMatrix::new(vec![1.0; 6], 2, 3, vec!["a".into()], vec![
            "x".into(),
            "y".into(),
            "z".into(),
        ]);
        assert!(matches!(
            err,
            Err(ZscoreError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let result = ExpressionMatrix::from_rows(
            vec![vec![1.0, 2.0], vec![3.0]],
            vec!["a".into(), "b".into()],
            vec!["s1".into(), "s2".into()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rows_mut_are_disjoint() {
        let mut mat = create_test_matrix();
        let views: Vec<RowView<'_>> = mat.rows_mut().collect();
        assert_eq!(views.len(), 3);
        for (i, view) in views.iter().enumerate() {
            assert_eq!(view.index(), i);
            assert_eq!(view.len(), 4);
        }
        for a in 0..views.len() {
            for b in (a + 1)..views.len() {
                let (x, y) = (views[a].span(), views[b].span());
                assert!(x.end <= y.start || y.end <= x.start);
            }
        }
    }

    #[test]
    fn test_rows_mut_writes_through() {
        let mut mat = create_test_matrix();
        for mut view in mat.rows_mut() {
            let idx = view.index() as f64;
            view.fill(idx);
        }
        assert_eq!(mat.row(0), &[0.0; 4]);
        assert_eq!(mat.row(2), &[2.0; 4]);
    }

    #[test]
    fn test_write_tsv_literal() {
        let mat = ExpressionMatrix::from_rows(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        let mut buf = Vec::new();
        mat.write_tsv(&mut buf, &TsvFormat::default()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Hugo_Symbol\ts1\ts2\ng1\t1\t2\ng2\t3\t4\n"
        );
    }

    #[test]
    fn test_write_tsv_precision() {
        let mat = ExpressionMatrix::from_rows(
            vec![vec![0.5, -1.25]],
            vec!["g1".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        let mut buf = Vec::new();
        mat.write_tsv(&mut buf, &TsvFormat::with_precision(4)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Hugo_Symbol\ts1\ts2\ng1\t0.5000\t-1.2500\n"
        );
    }

    #[test]
    fn test_tsv_roundtrip() {
        let mat = create_test_matrix();

        let temp_file = NamedTempFile::new().unwrap();
        mat.to_tsv(temp_file.path()).unwrap();

        let loaded = ExpressionMatrix::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded, mat);
    }

    #[test]
    fn test_from_tsv_na_and_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Hugo_Symbol\tA\tB").unwrap();
        writeln!(file, "TP53\t1.5\tNA").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "EGFR\t\t2").unwrap();
        file.flush().unwrap();

        let mat = ExpressionMatrix::from_tsv(file.path()).unwrap();
        assert_eq!(mat.n_rows(), 2);
        assert_eq!(mat.get(0, 0), 1.5);
        assert!(mat.get(0, 1).is_nan());
        assert!(mat.get(1, 0).is_nan());
        assert_eq!(mat.get(1, 1), 2.0);
    }

    #[test]
    fn test_from_tsv_errors() {
        let mut bad_value = NamedTempFile::new().unwrap();
        writeln!(bad_value, "Hugo_Symbol\tA\tB").unwrap();
        writeln!(bad_value, "TP53\t1\tabc").unwrap();
        bad_value.flush().unwrap();
        assert!(matches!(
            ExpressionMatrix::from_tsv(bad_value.path()),
            Err(ZscoreError::InvalidValue { row: 0, col: 1, .. })
        ));

        let mut short_row = NamedTempFile::new().unwrap();
        writeln!(short_row, "Hugo_Symbol\tA\tB").unwrap();
        writeln!(short_row, "TP53\t1").unwrap();
        short_row.flush().unwrap();
        assert!(matches!(
            ExpressionMatrix::from_tsv(short_row.path()),
            Err(ZscoreError::DimensionMismatch { expected: 3, actual: 2 })
        ));

        let mut header_only = NamedTempFile::new().unwrap();
        writeln!(header_only, "Hugo_Symbol\tA\tB").unwrap();
        header_only.flush().unwrap();
        assert!(matches!(
            ExpressionMatrix::from_tsv(header_only.path()),
            Err(ZscoreError::EmptyData(_))
        ));
    }

    #[test]
    fn test_to_tsv_unwritable_path() {
        let mat = create_test_matrix();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.tsv");
        assert!(matches!(mat.to_tsv(&path), Err(ZscoreError::Io(_))));
    }

    #[test]
    fn test_subset_samples() {
        let mat = create_test_matrix();
        let subset = mat
            .subset_samples(&["sample4".to_string(), "sample2".to_string()])
            .unwrap();

        assert_eq!(subset.n_rows(), 3);
        assert_eq!(subset.n_cols(), 2);
        assert_eq!(subset.sample_ids(), &["sample4", "sample2"]);
        assert_eq!(subset.row_ids(), mat.row_ids());
        assert_eq!(subset.row(0), &[5.0, 20.0]);
        assert_eq!(subset.row(1), &[175.0, 200.0]);

        let missing = mat.subset_samples(&["nope".to_string()]);
        assert!(matches!(missing, Err(ZscoreError::UnknownSample(s)) if s == "nope"));
    }

    #[test]
    fn test_dense_roundtrip() {
        let mat = create_test_matrix();
        let dense = mat.to_dense();
        assert_eq!(dense.shape(), (3, 4));
        assert_eq!(dense[(1, 2)], 150.0);

        let back = ExpressionMatrix::from_dense(
            &dense,
            mat.row_ids().to_vec(),
            mat.sample_ids().to_vec(),
        )
        .unwrap();
        assert_eq!(back, mat);
    }
}
