//! Model consistency errors.

use thiserror::Error;

/// Why a model is not fit to solve, one variant per rejection reason.
///
/// The display strings double as the diagnostic lines the protocol engine
/// writes to its error stream, so each names the offending indices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("no pressure datum specified")]
    NoPressureDatum,

    #[error("nodes {nodes:?} carry both a fixed pressure and a fixed flow")]
    OverlappingAssignments { nodes: Vec<usize> },

    #[error("nodes {nodes:?} have neither a fixed pressure nor a fixed flow")]
    UnassignedNodes { nodes: Vec<usize> },

    #[error("boundary assignments reference nodes {nodes:?} outside the model")]
    ForeignAssignments { nodes: Vec<usize> },

    #[error("incidence row {row} has {count} nonzero entries, expected 2")]
    MalformedRow { row: usize, count: usize },

    #[error("incidence row {row} entries {a} and {b} are not a +1/-1 pair")]
    NotUnitPair { row: usize, a: f64, b: f64 },

    #[error("zero resistance on branches {branches:?}")]
    ZeroResistance { branches: Vec<usize> },
}
