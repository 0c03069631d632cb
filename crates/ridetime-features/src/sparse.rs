//! Compressed sparse row matrix.

use ndarray::Array2;

/// Row-major sparse matrix in CSR layout.
///
/// Row `i` owns `indices[indptr[i]..indptr[i + 1]]` and the matching slice of
/// `values`. Column indices within a row are sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Build from per-row `(column, value)` entries.
    ///
    /// Entries are sorted by column; entries beyond `n_cols` are dropped.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        indptr.push(0);

        for mut row in rows {
            row.retain(|(c, _)| *c < n_cols);
            row.sort_by_key(|(c, _)| *c);
            for (c, v) in row {
                indices.push(c);
                values.push(v);
            }
            indptr.push(indices.len());
        }

        Self {
            n_cols,
            indptr,
            indices,
            values,
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Number of columns.
    pub const fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Stored entries of one row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.indptr[i]..self.indptr[i + 1];
        self.indices[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = (usize, f64)> + '_> + '_ {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    /// Dot product of row `i` with a dense weight vector.
    pub fn dot_row(&self, i: usize, weights: &[f64]) -> f64 {
        self.row(i).map(|(c, v)| v * weights[c]).sum()
    }

    /// Dense copy, for inspection and small problems.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros(self.shape());
        for i in 0..self.n_rows() {
            for (c, v) in self.row(i) {
                dense[[i, c]] += v;
            }
        }
        dense
    }
}
