//! Client-side command buffer and response readers.
//!
//! A driving process usually assembles a whole session script up front —
//! `new`, the branch and boundary definitions, `default`, `solve`,
//! `clear` — sends it in one write, then parses the status word and the
//! pressure block back. `CommandBuffer` builds such scripts; the readers
//! parse the responses. The integration tests drive full sessions with
//! them.

use std::io::Read;

use crate::command::Command;
use crate::error::ProtoError;
use crate::wire;

/// An accumulating, chainable encoder for session scripts.
///
/// ```
/// use pn_proto::CommandBuffer;
///
/// let mut buffer = CommandBuffer::new();
/// buffer
///     .new_model(2, 1)
///     .branch(0, 1, 0, 2.0)
///     .pressure(0, 10.0)
///     .set_default()
///     .solve()
///     .clear()
///     .quit();
/// assert!(!buffer.as_bytes().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, command: Command) -> &mut Self {
        command
            .write_to(&mut self.bytes)
            .expect("writing to a Vec cannot fail");
        self
    }

    pub fn new_model(&mut self, nodes: i32, branches: i32) -> &mut Self {
        self.push(Command::New { nodes, branches })
    }

    pub fn branch(&mut self, source: i32, sink: i32, branch: i32, resistance: f64) -> &mut Self {
        self.push(Command::Branch {
            source,
            sink,
            branch,
            resistance,
        })
    }

    pub fn pressure(&mut self, node: i32, value: f64) -> &mut Self {
        self.push(Command::Pressure { node, value })
    }

    pub fn flow(&mut self, node: i32, value: f64) -> &mut Self {
        self.push(Command::Flow { node, value })
    }

    pub fn set_default(&mut self) -> &mut Self {
        self.push(Command::Default)
    }

    pub fn verify(&mut self) -> &mut Self {
        self.push(Command::Verify)
    }

    pub fn solve(&mut self) -> &mut Self {
        self.push(Command::Solve)
    }

    pub fn clear(&mut self) -> &mut Self {
        self.push(Command::Clear)
    }

    pub fn quit(&mut self) -> &mut Self {
        self.push(Command::Quit)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Read a verify/solve status word: `1` is success, anything else failure.
pub fn read_status(r: &mut impl Read) -> Result<bool, ProtoError> {
    Ok(wire::read_i32(r)? == 1)
}

/// Read the pressure block of a successful solve, in node order.
pub fn read_pressures(r: &mut impl Read, nodes: usize) -> Result<Vec<f64>, ProtoError> {
    let mut pressures = Vec::with_capacity(nodes);
    for _ in 0..nodes {
        pressures.push(wire::read_f64(r)?);
    }
    Ok(pressures)
}
