//! Block reduction of the Kirchhoff system.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use pn_core::ensure_finite;
use pn_net::{Incidence, NetworkModel, SparseStore};

use crate::backend::{Backend, Reduced};
use crate::error::{SolveError, SolveResult};

/// Solve for unknown pressures, committing results into `model`.
///
/// Nodes split into the fixed-flow block `FQ` (pressures unknown) and the
/// fixed-pressure block `FP` (pressures given). With `B` the incidence
/// structure, `Bq`/`Bp` its `FQ`/`FP` column selections and
/// `Cinv = diag(1/r)`, the reduced system handed to the backend is
///
/// ```text
/// (Bqᵀ·Cinv·Bq) · p_unknown = Q − Bqᵀ·Cinv·(Bp·P)
/// ```
///
/// Sign convention: incidence rows carry `+1` at the branch source and
/// `-1` at the sink, so `flow_k = (p_source − p_sink)/r_k` is positive
/// when running source → sink, and a node's net outflow is the signed sum
/// of its incident branch flows.
///
/// On success the model's pressure vector is replaced, along with the flow
/// vector when `want_flow` is set (a pressures-only solve clears any flow
/// vector from an earlier solve). On failure both vectors are left
/// untouched.
pub fn solve(model: &mut NetworkModel, backend: &dyn Backend, want_flow: bool) -> SolveResult<()> {
    let nodes = model.node_count();
    let branches = model.branch_count();

    let fq: Vec<usize> = model.fixed_flow().keys().copied().collect();
    let fp: Vec<usize> = model.fixed_pressure().keys().copied().collect();
    if let Some(&bad) = fq.iter().chain(fp.iter()).find(|&&n| n >= nodes) {
        return Err(SolveError::InvalidArg {
            what: format!("boundary assignment references node {bad} outside 0..{nodes}"),
        });
    }

    let q_vec = DVector::from_iterator(fq.len(), fq.iter().map(|n| model.fixed_flow()[n]));
    let p_vec = DVector::from_iterator(fp.len(), fp.iter().map(|n| model.fixed_pressure()[n]));

    let mut cinv = DVector::zeros(branches);
    for (k, &r) in model.resistance().iter().enumerate() {
        cinv[k] = ensure_finite(1.0 / r, "branch conductance").map_err(|_| {
            SolveError::InvalidArg {
                what: format!("branch {k} resistance {r} gives a non-finite conductance"),
            }
        })?;
    }

    let bq = gather_columns(model.incidence(), &fq, backend)?;
    let bp = gather_columns(model.incidence(), &fp, backend)?;

    let (reduced, rhs) = match (&bq, &bp) {
        (Incidence::Dense(bq), Incidence::Dense(bp)) => {
            reduce_dense(bq, bp, &cinv, &q_vec, &p_vec)
        }
        (Incidence::Sparse(bq), Incidence::Sparse(bp)) => {
            reduce_sparse(bq, bp, &cinv, &q_vec, &p_vec)
        }
        _ => {
            return Err(SolveError::Unexpected {
                what: "column selection produced mixed storage".into(),
            });
        }
    };

    tracing::debug!(
        unknowns = fq.len(),
        data = fp.len(),
        storage = reduced.storage_name(),
        "reduced system assembled"
    );

    let p_unknown = backend.solve(reduced, rhs)?;
    if p_unknown.len() != fq.len() {
        return Err(SolveError::Unexpected {
            what: format!(
                "backend returned {} unknowns, expected {}",
                p_unknown.len(),
                fq.len()
            ),
        });
    }

    let mut pressures = model.pressures().to_vec();
    for (idx, &node) in fq.iter().enumerate() {
        pressures[node] = p_unknown[idx];
    }
    for (idx, &node) in fp.iter().enumerate() {
        pressures[node] = p_vec[idx];
    }

    let flows = if want_flow {
        let p = DVector::from_column_slice(&pressures);
        let drop = model.incidence().mul_vec(&p);
        Some((0..branches).map(|k| cinv[k] * drop[k]).collect())
    } else {
        None
    };

    model.store_solution(pressures, flows);
    Ok(())
}

/// Select `cols` from `src` into a fresh store from the backend's
/// allocator, so submatrices share the storage policy.
fn gather_columns(
    src: &Incidence,
    cols: &[usize],
    backend: &dyn Backend,
) -> SolveResult<Incidence> {
    let mut out = backend.allocate(src.nrows(), cols.len());
    match (src, &mut out) {
        (Incidence::Dense(s), Incidence::Dense(dst)) => {
            for (ci, &col) in cols.iter().enumerate() {
                dst.set_column(ci, &s.column(col));
            }
        }
        (Incidence::Sparse(s), Incidence::Sparse(dst)) => {
            let position: HashMap<usize, usize> =
                cols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
            for (r, c, v) in s.triplets() {
                if let Some(&ci) = position.get(&c) {
                    dst.insert(r, ci, v);
                }
            }
        }
        _ => {
            return Err(SolveError::Unexpected {
                what: "backend storage does not match the model incidence".into(),
            });
        }
    }
    Ok(out)
}

fn reduce_dense(
    bq: &DMatrix<f64>,
    bp: &DMatrix<f64>,
    cinv: &DVector<f64>,
    q: &DVector<f64>,
    p: &DVector<f64>,
) -> (Reduced, DVector<f64>) {
    let bqr = bq.transpose() * DMatrix::from_diagonal(cinv);
    let x = &bqr * bq;
    let rhs = q - &bqr * (bp * p);
    (Reduced::Dense(x), rhs)
}

fn reduce_sparse(
    bq: &SparseStore,
    bp: &SparseStore,
    cinv: &DVector<f64>,
    q: &DVector<f64>,
    p: &DVector<f64>,
) -> (Reduced, DVector<f64>) {
    let bq_csc = to_csc(bq);
    let bp_csc = to_csc(bp);
    let cinv_csc = diag_csc(cinv);
    let bq_t = bq_csc.transpose();
    let bqr = &bq_t * &cinv_csc;
    let x = &bqr * &bq_csc;
    let bp_p: DVector<f64> = &bp_csc * p;
    let rhs = q - &bqr * &bp_p;
    (Reduced::Sparse(x), rhs)
}

fn to_csc(store: &SparseStore) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(store.nrows(), store.ncols());
    for (r, c, v) in store.triplets() {
        coo.push(r, c, v);
    }
    CscMatrix::from(&coo)
}

fn diag_csc(cinv: &DVector<f64>) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(cinv.len(), cinv.len());
    for (k, &g) in cinv.iter().enumerate() {
        coo.push(k, k, g);
    }
    CscMatrix::from(&coo)
}
