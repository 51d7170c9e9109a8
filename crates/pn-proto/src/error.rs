//! Protocol error types.

use pn_core::PnError;
use std::io;
use thiserror::Error;

/// Session-level failures.
///
/// Everything except [`ProtoError::Io`] is an anticipated protocol fault:
/// reported once on the diagnostic stream, the session ends, the process
/// does not. `Io` is a genuine stream failure and propagates out.
#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("unrecognized opcode {0}")]
    UnknownOpcode(i32),

    #[error("command stream ended mid-command; input was closed prematurely")]
    Truncated,

    #[error("'{command}' received with no active model")]
    NoModel { command: &'static str },

    #[error("malformed field: {what}")]
    BadField { what: String },

    #[error("model update failed: {0}")]
    Model(#[from] PnError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProtoError {
    /// Whether this is an anticipated, reportable protocol fault rather
    /// than a stream failure.
    pub fn is_fault(&self) -> bool {
        !matches!(self, ProtoError::Io(_))
    }
}
