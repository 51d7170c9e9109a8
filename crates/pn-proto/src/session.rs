//! The session state machine.
//!
//! A session owns three streams (command input, result output, diagnostic
//! output) and at most one live model. Commands are processed strictly in
//! order; each response is fully written and flushed before the next
//! opcode is read.
//!
//! Fault handling follows the three-class design: validation and solve
//! failures answer `0` plus a diagnostic line and the session continues;
//! protocol faults (unknown opcode, truncated payload, sequencing errors,
//! unstorable indices) write one diagnostic line and end the session
//! without resynchronizing. Only raw stream failures propagate out.

use std::io::{Read, Write};

use pn_net::{NetworkModel, verify};
use pn_solver::Backend;

use crate::command::Command;
use crate::error::ProtoError;
use crate::wire;

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The driver sent `quit`.
    Quit,
    /// The command stream closed cleanly between commands.
    InputClosed,
    /// A protocol fault was reported and the session stopped.
    Fault,
}

/// One protocol session over three byte streams.
pub struct Session<R, W, E> {
    input: R,
    output: W,
    diag: E,
    backend: Box<dyn Backend>,
    model: Option<NetworkModel>,
}

impl<R: Read, W: Write, E: Write> Session<R, W, E> {
    pub fn new(input: R, output: W, diag: E, backend: Box<dyn Backend>) -> Self {
        Self {
            input,
            output,
            diag,
            backend,
            model: None,
        }
    }

    /// Process commands until quit, clean end of input, a protocol fault,
    /// or a stream failure.
    pub fn run(mut self) -> Result<SessionEnd, ProtoError> {
        loop {
            let command = match Command::read_from(&mut self.input) {
                Ok(Some(command)) => command,
                Ok(None) => return Ok(SessionEnd::InputClosed),
                Err(e) if e.is_fault() => {
                    self.diag_line(&e.to_string())?;
                    return Ok(SessionEnd::Fault);
                }
                Err(e) => return Err(e),
            };
            tracing::debug!(command = command.name(), "dispatching");
            if let Command::Quit = command {
                return Ok(SessionEnd::Quit);
            }
            match self.apply(command) {
                Ok(()) => {}
                Err(e) if e.is_fault() => {
                    self.diag_line(&e.to_string())?;
                    return Ok(SessionEnd::Fault);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<(), ProtoError> {
        match command {
            Command::Quit => Ok(()),
            Command::New { nodes, branches } => {
                let n = non_negative(nodes, "node count")?;
                let m = non_negative(branches, "branch count")?;
                let incidence = self.backend.allocate(m, n);
                self.model = Some(NetworkModel::new(n, m, incidence)?);
                Ok(())
            }
            Command::Branch {
                source,
                sink,
                branch,
                resistance,
            } => {
                let i = non_negative(source, "branch source node")?;
                let j = non_negative(sink, "branch sink node")?;
                let k = non_negative(branch, "branch index")?;
                self.model_mut("branch")?.add_branch(i, j, k, resistance)?;
                Ok(())
            }
            Command::Pressure { node, value } => {
                let i = non_negative(node, "node index")?;
                self.model_mut("pressure")?.set_pressure(i, value);
                Ok(())
            }
            Command::Flow { node, value } => {
                let i = non_negative(node, "node index")?;
                self.model_mut("flow")?.set_flow(i, value);
                Ok(())
            }
            Command::Default => {
                self.model_mut("default")?.set_default_flow();
                Ok(())
            }
            Command::Verify => self.handle_verify(),
            Command::Solve => self.handle_solve(),
            Command::Clear => {
                // Dropping nothing is fine; the drop is idempotent.
                self.model = None;
                Ok(())
            }
        }
    }

    fn handle_verify(&mut self) -> Result<(), ProtoError> {
        let outcome = match self.model.as_ref() {
            None => return Err(ProtoError::NoModel { command: "verify" }),
            Some(model) => verify(model),
        };
        match outcome {
            Ok(()) => {
                wire::write_i32(&mut self.output, 1)?;
                self.output.flush()?;
            }
            Err(reason) => {
                wire::write_i32(&mut self.output, 0)?;
                self.output.flush()?;
                self.diag_line(&reason.to_string())?;
            }
        }
        Ok(())
    }

    fn handle_solve(&mut self) -> Result<(), ProtoError> {
        // The wire response carries pressures only; flow solving stays a
        // library-level call.
        let response = match self.model.as_mut() {
            None => return Err(ProtoError::NoModel { command: "solve" }),
            Some(model) => pn_solver::solve(model, self.backend.as_ref(), false)
                .map(|()| model.pressures().to_vec()),
        };
        match response {
            Ok(pressures) => {
                wire::write_i32(&mut self.output, 1)?;
                for p in pressures {
                    wire::write_f64(&mut self.output, p)?;
                }
                self.output.flush()?;
            }
            Err(reason) => {
                wire::write_i32(&mut self.output, 0)?;
                self.output.flush()?;
                self.diag_line(&reason.to_string())?;
            }
        }
        Ok(())
    }

    fn model_mut(&mut self, command: &'static str) -> Result<&mut NetworkModel, ProtoError> {
        self.model
            .as_mut()
            .ok_or(ProtoError::NoModel { command })
    }

    fn diag_line(&mut self, line: &str) -> Result<(), ProtoError> {
        writeln!(self.diag, "{line}")?;
        self.diag.flush()?;
        Ok(())
    }
}

fn non_negative(value: i32, what: &'static str) -> Result<usize, ProtoError> {
    usize::try_from(value).map_err(|_| ProtoError::BadField {
        what: format!("{what} {value} is negative"),
    })
}
