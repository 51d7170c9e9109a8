//! Sparse storage policies: CSC Cholesky direct solve, and the variant
//! that densifies the reduced matrix before a dense factorization.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use pn_net::Incidence;

use crate::backend::{Backend, RawFailure, Reduced};
use crate::dense::{DenseRoutine, run_routine};
use crate::error::SolveError;

/// Sparse storage + sparse direct solve.
///
/// The direct routine is the CSC Cholesky factorization; a reduced matrix
/// that is singular (a component without a pressure datum) or indefinite
/// (negative resistances) fails to factor and is reported as a numerical
/// failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseBackend;

impl Backend for SparseBackend {
    fn name(&self) -> &'static str {
        "sparse-direct"
    }

    fn allocate(&self, rows: usize, cols: usize) -> Incidence {
        Incidence::sparse(rows, cols)
    }

    fn solve(&self, a: Reduced, b: DVector<f64>) -> Result<DVector<f64>, SolveError> {
        let Reduced::Sparse(a) = a else {
            return Err(self.classify(RawFailure::StorageMismatch {
                expected: "sparse",
                got: "dense",
            }));
        };
        let (rows, cols, rhs) = (a.nrows(), a.ncols(), b.len());
        if rows != cols || rows != rhs {
            return Err(self.classify(RawFailure::ShapeMismatch { rows, cols, rhs }));
        }
        let chol = CscCholesky::factor(&a)
            .map_err(|_| self.classify(RawFailure::NotPositiveDefinite))?;
        let rhs = DMatrix::from_column_slice(b.len(), 1, b.as_slice());
        Ok(chol.solve(&rhs).column(0).into_owned())
    }
}

/// Sparse storage, densified just before a dense direct solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensifyBackend {
    routine: DenseRoutine,
}

impl DensifyBackend {
    pub fn new(routine: DenseRoutine) -> Self {
        Self { routine }
    }

    pub fn routine(&self) -> DenseRoutine {
        self.routine
    }
}

impl Backend for DensifyBackend {
    fn name(&self) -> &'static str {
        "sparse-densify"
    }

    fn allocate(&self, rows: usize, cols: usize) -> Incidence {
        Incidence::sparse(rows, cols)
    }

    fn solve(&self, a: Reduced, b: DVector<f64>) -> Result<DVector<f64>, SolveError> {
        let Reduced::Sparse(a) = a else {
            return Err(self.classify(RawFailure::StorageMismatch {
                expected: "sparse",
                got: "dense",
            }));
        };
        let dense = DMatrix::from(&a);
        run_routine(self.routine, dense, &b).map_err(|raw| self.classify(raw))
    }
}
