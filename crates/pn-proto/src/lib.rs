//! pn-proto: the binary session protocol for presnet.
//!
//! Provides:
//! - Little-endian field I/O over byte streams (`wire`)
//! - The sealed command enumeration, decoded once per command (`command`)
//! - The session state machine driving a model over three streams
//!   (`session`)
//! - A client-side command buffer and response readers for driving a
//!   session from the other end (`client`)
//!
//! Control flow is strictly sequential: one command is fully processed,
//! its response written and flushed, before the next opcode is read.

pub mod client;
pub mod command;
pub mod error;
pub mod session;
pub mod wire;

// Re-exports for ergonomics
pub use client::CommandBuffer;
pub use command::Command;
pub use error::ProtoError;
pub use session::{Session, SessionEnd};
