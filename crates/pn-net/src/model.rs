//! The mutable network model.
//!
//! Holds node/branch counts, the signed incidence structure, branch
//! resistances, the two boundary-condition maps, and the result vectors
//! written by a successful solve. Mutations are deliberately permissive:
//! between commands the model may be inconsistent (a node in both maps, an
//! unassigned node, a zero resistance) and only the validator decides
//! whether it is fit to solve.

use std::collections::BTreeMap;

use pn_core::{PnError, PnResult};

use crate::incidence::Incidence;

/// A resistive flow network with mixed boundary conditions.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    node_count: usize,
    branch_count: usize,
    incidence: Incidence,
    resistance: Vec<f64>,
    fixed_pressure: BTreeMap<usize, f64>,
    fixed_flow: BTreeMap<usize, f64>,
    pressures: Vec<f64>,
    flows: Option<Vec<f64>>,
}

impl NetworkModel {
    /// Create a blank model over a pre-allocated incidence store.
    ///
    /// The store shape must be `branch_count × node_count`.
    pub fn new(node_count: usize, branch_count: usize, incidence: Incidence) -> PnResult<Self> {
        if incidence.nrows() != branch_count || incidence.ncols() != node_count {
            return Err(PnError::Invariant {
                what: "incidence store shape does not match node/branch counts",
            });
        }
        Ok(Self {
            node_count,
            branch_count,
            incidence,
            resistance: vec![0.0; branch_count],
            fixed_pressure: BTreeMap::new(),
            fixed_flow: BTreeMap::new(),
            pressures: vec![0.0; node_count],
            flows: None,
        })
    }

    /// Define branch `branch` as `source -> sink` with resistance `resistance`.
    ///
    /// Re-issuing the same branch index overwrites the whole prior
    /// definition. No resistance-sign validation happens here; a zero or
    /// negative value is stored as-is and left for the validator.
    pub fn add_branch(
        &mut self,
        source: usize,
        sink: usize,
        branch: usize,
        resistance: f64,
    ) -> PnResult<()> {
        if branch >= self.branch_count {
            return Err(PnError::IndexOob {
                what: "branch index",
                index: branch,
                len: self.branch_count,
            });
        }
        for node in [source, sink] {
            if node >= self.node_count {
                return Err(PnError::IndexOob {
                    what: "branch endpoint",
                    index: node,
                    len: self.node_count,
                });
            }
        }
        self.incidence.set_row(branch, source, sink);
        self.resistance[branch] = resistance;
        Ok(())
    }

    /// Fix the pressure at `node`. Last write wins.
    ///
    /// Does not clear a fixed-flow entry for the same node; the overlap is
    /// a validation failure, not a storage one.
    pub fn set_pressure(&mut self, node: usize, value: f64) {
        self.fixed_pressure.insert(node, value);
    }

    /// Fix the net outward flow at `node`. Last write wins.
    pub fn set_flow(&mut self, node: usize, value: f64) {
        self.fixed_flow.insert(node, value);
    }

    /// Give every node absent from both maps a fixed net outflow of zero.
    ///
    /// Existing entries of either kind are never touched.
    pub fn set_default_flow(&mut self) {
        for node in 0..self.node_count {
            if !self.fixed_pressure.contains_key(&node) && !self.fixed_flow.contains_key(&node) {
                self.fixed_flow.insert(node, 0.0);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    pub fn incidence(&self) -> &Incidence {
        &self.incidence
    }

    #[cfg(test)]
    pub(crate) fn incidence_mut(&mut self) -> &mut Incidence {
        &mut self.incidence
    }

    pub fn resistance(&self) -> &[f64] {
        &self.resistance
    }

    pub fn fixed_pressure(&self) -> &BTreeMap<usize, f64> {
        &self.fixed_pressure
    }

    pub fn fixed_flow(&self) -> &BTreeMap<usize, f64> {
        &self.fixed_flow
    }

    /// Node pressures; meaningful only after a successful solve.
    pub fn pressures(&self) -> &[f64] {
        &self.pressures
    }

    /// Branch flows from the last flow-producing solve, if any.
    pub fn flows(&self) -> Option<&[f64]> {
        self.flows.as_deref()
    }

    /// Commit a solve result. Called by the solver only after the backend
    /// solve succeeded; a failed solve leaves both vectors untouched.
    pub fn store_solution(&mut self, pressures: Vec<f64>, flows: Option<Vec<f64>>) {
        self.pressures = pressures;
        self.flows = flows;
    }
}
