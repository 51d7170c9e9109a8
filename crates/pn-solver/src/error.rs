//! Error types for solve operations.

use thiserror::Error;

/// Errors that can occur during a network solve.
///
/// The three variants are the three user-visible failure classes: genuine
/// linear-algebra breakdowns, inputs the reduction cannot accept, and
/// everything else.
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("linear algebra failure in solve: {what}")]
    Numerical { what: String },

    #[error("invalid argument in solve: {what}")]
    InvalidArg { what: String },

    #[error("unexpected failure in solve: {what}")]
    Unexpected { what: String },
}

pub type SolveResult<T> = Result<T, SolveError>;
