//! Read-only model consistency checking.

use crate::error::ValidationError;
use crate::model::NetworkModel;

/// Check that `model` is fit to solve.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. at least one pressure datum exists,
/// 2. no node carries both boundary kinds,
/// 3. the two maps cover `0..node_count` exactly,
/// 4. every incidence row is a `{+1, -1}` endpoint pair,
/// 5. every resistance is nonzero.
pub fn verify(model: &NetworkModel) -> Result<(), ValidationError> {
    let fp = model.fixed_pressure();
    let fq = model.fixed_flow();

    if fp.is_empty() {
        return Err(ValidationError::NoPressureDatum);
    }

    let overlap: Vec<usize> = fp.keys().filter(|n| fq.contains_key(*n)).copied().collect();
    if !overlap.is_empty() {
        return Err(ValidationError::OverlappingAssignments { nodes: overlap });
    }

    let missing: Vec<usize> = (0..model.node_count())
        .filter(|n| !fp.contains_key(n) && !fq.contains_key(n))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::UnassignedNodes { nodes: missing });
    }
    let foreign: Vec<usize> = fp
        .keys()
        .chain(fq.keys())
        .filter(|&&n| n >= model.node_count())
        .copied()
        .collect();
    if !foreign.is_empty() {
        return Err(ValidationError::ForeignAssignments { nodes: foreign });
    }

    for row in 0..model.branch_count() {
        let entries = model.incidence().row_nonzeros(row);
        if entries.len() != 2 {
            return Err(ValidationError::MalformedRow {
                row,
                count: entries.len(),
            });
        }
        let (a, b) = (entries[0].1, entries[1].1);
        if !((a == 1.0 && b == -1.0) || (a == -1.0 && b == 1.0)) {
            return Err(ValidationError::NotUnitPair { row, a, b });
        }
    }

    let zero: Vec<usize> = model
        .resistance()
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r == 0.0)
        .map(|(k, _)| k)
        .collect();
    if !zero.is_empty() {
        return Err(ValidationError::ZeroResistance { branches: zero });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidence::Incidence;

    fn two_node_model() -> NetworkModel {
        let mut model = NetworkModel::new(2, 1, Incidence::dense(1, 2)).unwrap();
        model.add_branch(0, 1, 0, 2.0).unwrap();
        model
    }

    #[test]
    fn well_posed_model_passes() {
        let mut model = two_node_model();
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        assert!(verify(&model).is_ok());
    }

    #[test]
    fn empty_pressure_set_is_rejected_first() {
        let mut model = two_node_model();
        model.set_flow(0, 0.0);
        model.set_flow(1, 0.0);
        assert_eq!(verify(&model).unwrap_err(), ValidationError::NoPressureDatum);
    }

    #[test]
    fn overlap_is_rejected() {
        let mut model = two_node_model();
        model.set_pressure(0, 10.0);
        model.set_flow(0, 1.0);
        model.set_flow(1, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::OverlappingAssignments { nodes: vec![0] }
        );
    }

    #[test]
    fn unassigned_node_is_rejected() {
        let mut model = two_node_model();
        model.set_pressure(0, 10.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::UnassignedNodes { nodes: vec![1] }
        );
    }

    #[test]
    fn foreign_assignment_is_rejected() {
        let mut model = two_node_model();
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        model.set_flow(9, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::ForeignAssignments { nodes: vec![9] }
        );
    }

    #[test]
    fn undefined_branch_row_is_rejected() {
        let mut model = NetworkModel::new(2, 2, Incidence::dense(2, 2)).unwrap();
        model.add_branch(0, 1, 0, 2.0).unwrap();
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::MalformedRow { row: 1, count: 0 }
        );
    }

    #[test]
    fn self_loop_row_is_rejected() {
        let mut model = two_node_model();
        model.add_branch(1, 1, 0, 2.0).unwrap();
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::MalformedRow { row: 0, count: 1 }
        );
    }

    #[test]
    fn corrupted_row_pair_is_rejected() {
        let mut model = two_node_model();
        model.incidence_mut().set(0, 0, 2.0);
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::NotUnitPair {
                row: 0,
                a: 2.0,
                b: -1.0
            }
        );
    }

    #[test]
    fn zero_resistance_is_rejected() {
        let mut model = two_node_model();
        model.add_branch(0, 1, 0, 0.0).unwrap();
        model.set_pressure(0, 10.0);
        model.set_flow(1, 0.0);
        assert_eq!(
            verify(&model).unwrap_err(),
            ValidationError::ZeroResistance { branches: vec![0] }
        );
    }
}
