//! Dense storage with named `nalgebra` factorizations.

use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use pn_net::Incidence;

use crate::backend::{Backend, RawFailure, Reduced};
use crate::error::SolveError;

/// Which dense factorization runs the direct solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenseRoutine {
    /// Partial-pivot LU.
    #[default]
    Lu,
    /// Full-pivot LU.
    FullLu,
    /// Householder QR.
    Qr,
    /// Cholesky; the reduced matrix is symmetric positive definite for
    /// networks with all-positive resistances.
    Cholesky,
}

impl DenseRoutine {
    pub fn name(&self) -> &'static str {
        match self {
            DenseRoutine::Lu => "lu",
            DenseRoutine::FullLu => "full-lu",
            DenseRoutine::Qr => "qr",
            DenseRoutine::Cholesky => "cholesky",
        }
    }
}

impl FromStr for DenseRoutine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lu" => Ok(DenseRoutine::Lu),
            "full-lu" => Ok(DenseRoutine::FullLu),
            "qr" => Ok(DenseRoutine::Qr),
            "cholesky" => Ok(DenseRoutine::Cholesky),
            other => Err(format!(
                "unknown solve routine '{other}' (expected lu, full-lu, qr or cholesky)"
            )),
        }
    }
}

/// Run one dense direct solve. Shared by the dense and densify policies.
pub(crate) fn run_routine(
    routine: DenseRoutine,
    a: DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, RawFailure> {
    let (rows, cols, rhs) = (a.nrows(), a.ncols(), b.len());
    if rows != cols || rows != rhs {
        return Err(RawFailure::ShapeMismatch { rows, cols, rhs });
    }
    match routine {
        DenseRoutine::Lu => a.lu().solve(b).ok_or(RawFailure::Singular),
        DenseRoutine::FullLu => a.full_piv_lu().solve(b).ok_or(RawFailure::Singular),
        DenseRoutine::Qr => a.qr().solve(b).ok_or(RawFailure::Singular),
        DenseRoutine::Cholesky => a
            .cholesky()
            .map(|chol| chol.solve(b))
            .ok_or(RawFailure::NotPositiveDefinite),
    }
}

/// Dense storage + dense direct solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseBackend {
    routine: DenseRoutine,
}

impl DenseBackend {
    pub fn new(routine: DenseRoutine) -> Self {
        Self { routine }
    }

    pub fn routine(&self) -> DenseRoutine {
        self.routine
    }
}

impl Backend for DenseBackend {
    fn name(&self) -> &'static str {
        "dense-direct"
    }

    fn allocate(&self, rows: usize, cols: usize) -> Incidence {
        Incidence::dense(rows, cols)
    }

    fn solve(&self, a: Reduced, b: DVector<f64>) -> Result<DVector<f64>, SolveError> {
        let Reduced::Dense(a) = a else {
            return Err(self.classify(RawFailure::StorageMismatch {
                expected: "dense",
                got: "sparse",
            }));
        };
        run_routine(self.routine, a, &b).map_err(|raw| self.classify(raw))
    }
}
