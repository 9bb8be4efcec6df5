//! Sparse user-item interaction matrix.
//!
//! Rows are users, columns are movies, cells are ratings. A stored value of
//! 0 means "no rating", not "rating of zero", so only strictly positive
//! ratings are meaningful. The matrix is built once by the trainer and is
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{IdMap, RatingRecord};

/// Compressed sparse row matrix of f32 ratings.
///
/// The usual CSR layout: `indptr` has `n_rows + 1` entries, row `r` occupies
/// `indices[indptr[r]..indptr[r+1]]` (column positions, ascending) and the
/// matching slice of `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<f32>,
}

impl CsrMatrix {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Sparse view of one row: parallel slices of column positions and values
    pub fn row(&self, row: usize) -> (&[u32], &[f32]) {
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        (&self.indices[start..end], &self.data[start..end])
    }

    /// Extract one row as a dense vector of length `n_cols`
    pub fn row_dense(&self, row: usize) -> Vec<f32> {
        let mut dense = vec![0.0; self.n_cols];
        let (cols, vals) = self.row(row);
        for (&c, &v) in cols.iter().zip(vals) {
            dense[c as usize] = v;
        }
        dense
    }

    /// Read a single cell; 0.0 for entries with no stored rating
    pub fn get(&self, row: usize, col: usize) -> f32 {
        let (cols, vals) = self.row(row);
        match cols.binary_search(&(col as u32)) {
            Ok(i) => vals[i],
            Err(_) => 0.0,
        }
    }

    /// Gather one column's value across a set of rows, in the given row order
    pub fn gather_column(&self, rows: &[usize], col: usize) -> Vec<f32> {
        rows.iter().map(|&r| self.get(r, col)).collect()
    }
}

/// Build the interaction matrix and both ID mappings from raw records.
///
/// Row and column positions are assigned in order of first appearance.
/// Duplicate (user, movie) pairs overwrite: the last record in the stream
/// wins, matching the documented training behavior.
pub fn build_user_item_matrix(records: &[RatingRecord]) -> (CsrMatrix, IdMap, IdMap) {
    let mut user_map = IdMap::new();
    let mut movie_map = IdMap::new();

    // Row-major staging maps; BTreeMap keeps columns sorted for CSR and
    // makes the last write win for duplicates.
    let mut rows: Vec<BTreeMap<u32, f32>> = Vec::new();
    for record in records {
        let row = user_map.assign(record.user_id);
        let col = movie_map.assign(record.movie_id) as u32;
        if row == rows.len() {
            rows.push(BTreeMap::new());
        }
        rows[row].insert(col, record.rating);
    }

    let nnz = rows.iter().map(|r| r.len()).sum();
    let mut indptr = Vec::with_capacity(rows.len() + 1);
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);
    indptr.push(0);
    for row in &rows {
        for (&col, &rating) in row {
            indices.push(col);
            data.push(rating);
        }
        indptr.push(indices.len());
    }

    let matrix = CsrMatrix {
        n_rows: user_map.len(),
        n_cols: movie_map.len(),
        indptr,
        indices,
        data,
    };
    (matrix, user_map, movie_map)
}
