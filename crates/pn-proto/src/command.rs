//! The sealed command enumeration.
//!
//! Every command starts with a 4-byte opcode followed by its fixed-width
//! payload. Decoding happens once, into a closed enum; dispatch is an
//! exhaustive match in the session. There is no open extensibility: an
//! opcode outside the table below is a protocol fault.
//!
//! ```text
//! 0 quit                    5 default
//! 1 new      n, m           6 verify
//! 2 branch   i, j, k, r     7 solve
//! 3 pressure i, p           8 clear
//! 4 flow     i, q
//! ```

use std::io::{self, Read, Write};

use crate::error::ProtoError;
use crate::wire;

pub const OP_QUIT: i32 = 0;
pub const OP_NEW: i32 = 1;
pub const OP_BRANCH: i32 = 2;
pub const OP_PRESSURE: i32 = 3;
pub const OP_FLOW: i32 = 4;
pub const OP_DEFAULT: i32 = 5;
pub const OP_VERIFY: i32 = 6;
pub const OP_SOLVE: i32 = 7;
pub const OP_CLEAR: i32 = 8;

/// One decoded protocol command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    New { nodes: i32, branches: i32 },
    Branch { source: i32, sink: i32, branch: i32, resistance: f64 },
    Pressure { node: i32, value: f64 },
    Flow { node: i32, value: f64 },
    Default,
    Verify,
    Solve,
    Clear,
}

impl Command {
    /// Command name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Quit => "quit",
            Command::New { .. } => "new",
            Command::Branch { .. } => "branch",
            Command::Pressure { .. } => "pressure",
            Command::Flow { .. } => "flow",
            Command::Default => "default",
            Command::Verify => "verify",
            Command::Solve => "solve",
            Command::Clear => "clear",
        }
    }

    /// Decode the next command from `r`.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between commands.
    /// EOF inside an opcode or payload is a truncation fault; an opcode
    /// outside the table is an unknown-opcode fault.
    pub fn read_from(r: &mut impl Read) -> Result<Option<Command>, ProtoError> {
        let Some(opcode) = wire::try_read_i32(r)? else {
            return Ok(None);
        };
        let command = match opcode {
            OP_QUIT => Command::Quit,
            OP_NEW => Command::New {
                nodes: wire::read_i32(r)?,
                branches: wire::read_i32(r)?,
            },
            OP_BRANCH => Command::Branch {
                source: wire::read_i32(r)?,
                sink: wire::read_i32(r)?,
                branch: wire::read_i32(r)?,
                resistance: wire::read_f64(r)?,
            },
            OP_PRESSURE => Command::Pressure {
                node: wire::read_i32(r)?,
                value: wire::read_f64(r)?,
            },
            OP_FLOW => Command::Flow {
                node: wire::read_i32(r)?,
                value: wire::read_f64(r)?,
            },
            OP_DEFAULT => Command::Default,
            OP_VERIFY => Command::Verify,
            OP_SOLVE => Command::Solve,
            OP_CLEAR => Command::Clear,
            other => return Err(ProtoError::UnknownOpcode(other)),
        };
        Ok(Some(command))
    }

    /// Encode this command onto `w`, the exact inverse of [`read_from`].
    ///
    /// [`read_from`]: Command::read_from
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        match *self {
            Command::Quit => wire::write_i32(w, OP_QUIT),
            Command::New { nodes, branches } => {
                wire::write_i32(w, OP_NEW)?;
                wire::write_i32(w, nodes)?;
                wire::write_i32(w, branches)
            }
            Command::Branch {
                source,
                sink,
                branch,
                resistance,
            } => {
                wire::write_i32(w, OP_BRANCH)?;
                wire::write_i32(w, source)?;
                wire::write_i32(w, sink)?;
                wire::write_i32(w, branch)?;
                wire::write_f64(w, resistance)
            }
            Command::Pressure { node, value } => {
                wire::write_i32(w, OP_PRESSURE)?;
                wire::write_i32(w, node)?;
                wire::write_f64(w, value)
            }
            Command::Flow { node, value } => {
                wire::write_i32(w, OP_FLOW)?;
                wire::write_i32(w, node)?;
                wire::write_f64(w, value)
            }
            Command::Default => wire::write_i32(w, OP_DEFAULT),
            Command::Verify => wire::write_i32(w, OP_VERIFY),
            Command::Solve => wire::write_i32(w, OP_SOLVE),
            Command::Clear => wire::write_i32(w, OP_CLEAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(cmd: Command) -> Command {
        let mut buf = Vec::new();
        cmd.write_to(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let back = Command::read_from(&mut cursor).unwrap().unwrap();
        assert_eq!(cursor.position() as usize, cursor.get_ref().len());
        back
    }

    #[test]
    fn every_command_round_trips() {
        let commands = [
            Command::Quit,
            Command::New { nodes: 3, branches: 2 },
            Command::Branch {
                source: 0,
                sink: 1,
                branch: 0,
                resistance: 2.5,
            },
            Command::Pressure { node: 0, value: 10.0 },
            Command::Flow { node: 1, value: -0.5 },
            Command::Default,
            Command::Verify,
            Command::Solve,
            Command::Clear,
        ];
        for cmd in commands {
            assert_eq!(round_trip(cmd), cmd);
        }
    }

    #[test]
    fn unknown_opcode_is_a_fault() {
        let mut buf = Vec::new();
        crate::wire::write_i32(&mut buf, 42).unwrap();
        let err = Command::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, ProtoError::UnknownOpcode(42)));
    }

    #[test]
    fn truncated_payload_is_a_fault() {
        let mut buf = Vec::new();
        Command::Branch {
            source: 0,
            sink: 1,
            branch: 0,
            resistance: 1.0,
        }
        .write_to(&mut buf)
        .unwrap();
        buf.truncate(10);
        let err = Command::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, ProtoError::Truncated));
    }

    #[test]
    fn clean_eof_is_not_a_command() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(Command::read_from(&mut cursor).unwrap().is_none());
    }
}
