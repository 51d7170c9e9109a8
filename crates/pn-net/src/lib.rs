//! pn-net: network data model for presnet.
//!
//! Provides:
//! - Incidence storage (dense matrix or sparse dictionary-of-keys rows)
//! - The mutable network model: counts, resistances, boundary conditions,
//!   and the pressure/flow result vectors
//! - The read-only consistency checker run before a solve is trusted
//!
//! # Example
//!
//! ```
//! use pn_net::{Incidence, NetworkModel, verify};
//!
//! let mut model = NetworkModel::new(2, 1, Incidence::dense(1, 2)).unwrap();
//! model.add_branch(0, 1, 0, 2.0).unwrap();
//! model.set_pressure(0, 10.0);
//! model.set_default_flow();
//! assert!(verify(&model).is_ok());
//! ```

pub mod error;
pub mod incidence;
pub mod model;
pub mod validate;

// Re-exports for ergonomics
pub use error::ValidationError;
pub use incidence::{Incidence, SparseStore};
pub use model::NetworkModel;
pub use validate::verify;
