//! The storage/solve strategy seam.
//!
//! A backend owns three capabilities: allocating incidence storage in its
//! preferred format, running a direct solve on the reduced system, and
//! classifying raw solve-routine failures onto the user-visible error
//! classes. One backend is bound at process start and never swapped while
//! a session is live.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;
use pn_net::Incidence;

use crate::error::SolveError;

/// The reduced `|FQ| × |FQ|` system matrix, in the backend's storage.
#[derive(Debug, Clone)]
pub enum Reduced {
    Dense(DMatrix<f64>),
    Sparse(CscMatrix<f64>),
}

impl Reduced {
    pub fn nrows(&self) -> usize {
        match self {
            Reduced::Dense(m) => m.nrows(),
            Reduced::Sparse(m) => m.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Reduced::Dense(m) => m.ncols(),
            Reduced::Sparse(m) => m.ncols(),
        }
    }

    pub fn storage_name(&self) -> &'static str {
        match self {
            Reduced::Dense(_) => "dense",
            Reduced::Sparse(_) => "sparse",
        }
    }
}

/// Raw failure surfaced by a solve routine before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFailure {
    /// Factorization found the reduced matrix singular.
    Singular,
    /// Cholesky-style factorization rejected the reduced matrix.
    NotPositiveDefinite,
    /// Matrix/right-hand-side dimensions do not line up.
    ShapeMismatch {
        rows: usize,
        cols: usize,
        rhs: usize,
    },
    /// The backend received the other policy's storage format.
    StorageMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// Anything else the routine reported.
    Message(String),
}

/// Matrix allocation, direct solve, and failure classification, fixed for
/// the process lifetime.
pub trait Backend {
    /// Policy label for startup logging.
    fn name(&self) -> &'static str;

    /// Allocate a zero `rows × cols` store in this policy's format. Used
    /// for the model incidence structure and for the column-selected
    /// submatrices of the reduction.
    fn allocate(&self, rows: usize, cols: usize) -> Incidence;

    /// Solve `a · x = b` with this policy's direct routine.
    fn solve(&self, a: Reduced, b: DVector<f64>) -> Result<DVector<f64>, SolveError>;

    /// Map a raw routine failure onto an error class.
    fn classify(&self, raw: RawFailure) -> SolveError {
        match raw {
            RawFailure::Singular => SolveError::Numerical {
                what: "reduced matrix is singular".into(),
            },
            RawFailure::NotPositiveDefinite => SolveError::Numerical {
                what: "reduced matrix is not positive definite".into(),
            },
            RawFailure::ShapeMismatch { rows, cols, rhs } => SolveError::InvalidArg {
                what: format!("reduced system shape mismatch: {rows}x{cols} matrix, rhs length {rhs}"),
            },
            RawFailure::StorageMismatch { expected, got } => SolveError::InvalidArg {
                what: format!("backend expects {expected} storage, received {got}"),
            },
            RawFailure::Message(what) => SolveError::Unexpected { what },
        }
    }
}
