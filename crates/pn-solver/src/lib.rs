//! Block-reduction pressure solver for presnet networks.
//!
//! This crate solves for the unknown pressures at fixed-flow nodes by
//! eliminating the known-pressure block from the Kirchhoff system:
//! with `B` the signed incidence structure and `Cinv = diag(1/r)`, the
//! reduced system is `(Bqᵀ·Cinv·Bq)·p = Q − Bqᵀ·Cinv·(Bp·P)`.
//!
//! Matrix storage and the direct solve routine are policies behind the
//! [`Backend`] trait, bound once at process start:
//! - dense storage + a named `nalgebra` factorization,
//! - sparse storage + the `nalgebra-sparse` CSC Cholesky factorization,
//! - sparse storage densified just before a dense factorization.

pub mod backend;
pub mod dense;
pub mod error;
pub mod reduce;
pub mod sparse;

pub use backend::{Backend, RawFailure, Reduced};
pub use dense::{DenseBackend, DenseRoutine};
pub use error::{SolveError, SolveResult};
pub use reduce::solve;
pub use sparse::{DensifyBackend, SparseBackend};
