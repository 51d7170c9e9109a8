//! Signed incidence storage.
//!
//! Two concrete stores behind one enum: a dense matrix and a sparse
//! dictionary-of-keys construction format held as one column map per row.
//! The store is picked once at process start by the solve backend and every
//! matrix the model allocates afterwards shares it.

use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Sparse construction store: one column map per row.
///
/// Cheap to mutate row-wise while the model is being built; the solver
/// converts it to a compressed format when it needs matrix products.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseStore {
    ncols: usize,
    rows: Vec<BTreeMap<usize, f64>>,
}

impl SparseStore {
    /// An empty store with the given shape.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            ncols,
            rows: vec![BTreeMap::new(); nrows],
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Entry at `(row, col)`, zero when absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row].get(&col).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, row: usize, col: usize, value: f64) {
        self.rows[row].insert(col, value);
    }

    /// Drop every entry in `row`.
    pub fn clear_row(&mut self, row: usize) {
        self.rows[row].clear();
    }

    /// Nonzero entries of `row` as `(col, value)`, ascending column order.
    pub fn row_nonzeros(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows[row]
            .iter()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(&c, &v)| (c, v))
    }

    /// All nonzero entries as `(row, col, value)` triplets.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, cols)| {
            cols.iter()
                .filter(|&(_, &v)| v != 0.0)
                .map(move |(&c, &v)| (r, c, v))
        })
    }
}

/// Signed incidence storage, dense or sparse.
#[derive(Debug, Clone)]
pub enum Incidence {
    Dense(DMatrix<f64>),
    Sparse(SparseStore),
}

impl Incidence {
    /// A dense zero store with the given shape.
    pub fn dense(nrows: usize, ncols: usize) -> Self {
        Incidence::Dense(DMatrix::zeros(nrows, ncols))
    }

    /// A sparse zero store with the given shape.
    pub fn sparse(nrows: usize, ncols: usize) -> Self {
        Incidence::Sparse(SparseStore::zeros(nrows, ncols))
    }

    pub fn nrows(&self) -> usize {
        match self {
            Incidence::Dense(m) => m.nrows(),
            Incidence::Sparse(s) => s.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Incidence::Dense(m) => m.ncols(),
            Incidence::Sparse(s) => s.ncols(),
        }
    }

    /// Storage label for diagnostics.
    pub fn storage_name(&self) -> &'static str {
        match self {
            Incidence::Dense(_) => "dense",
            Incidence::Sparse(_) => "sparse",
        }
    }

    /// Entry at `(row, col)`, zero when absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            Incidence::Dense(m) => m[(row, col)],
            Incidence::Sparse(s) => s.get(row, col),
        }
    }

    /// Write a single entry.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        match self {
            Incidence::Dense(m) => m[(row, col)] = value,
            Incidence::Sparse(s) => s.insert(row, col, value),
        }
    }

    /// Replace `row` with the signed pair `+1` at `source`, `-1` at `sink`.
    ///
    /// The whole row is cleared first, so redefining a branch with different
    /// endpoints leaves no stale entries behind. `source == sink` collapses
    /// to a single `-1` entry and is left for the validator to reject.
    pub fn set_row(&mut self, row: usize, source: usize, sink: usize) {
        match self {
            Incidence::Dense(m) => {
                m.row_mut(row).fill(0.0);
                m[(row, source)] = 1.0;
                m[(row, sink)] = -1.0;
            }
            Incidence::Sparse(s) => {
                s.clear_row(row);
                s.insert(row, source, 1.0);
                s.insert(row, sink, -1.0);
            }
        }
    }

    /// Nonzero entries of `row` as `(col, value)` pairs.
    pub fn row_nonzeros(&self, row: usize) -> Vec<(usize, f64)> {
        match self {
            Incidence::Dense(m) => m
                .row(row)
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0.0)
                .map(|(c, &v)| (c, v))
                .collect(),
            Incidence::Sparse(s) => s.row_nonzeros(row).collect(),
        }
    }

    /// Matrix-vector product against the full store.
    pub fn mul_vec(&self, v: &DVector<f64>) -> DVector<f64> {
        match self {
            Incidence::Dense(m) => m * v,
            Incidence::Sparse(s) => {
                let mut out = DVector::zeros(s.nrows());
                for (r, c, val) in s.triplets() {
                    out[r] += val * v[c];
                }
                out
            }
        }
    }
}
