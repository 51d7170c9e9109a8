//! Integration test: full binary sessions over in-memory streams, against
//! every storage/solve policy.

use std::io::Cursor;

use pn_core::{Tolerances, nearly_equal};
use pn_proto::client::{read_pressures, read_status};
use pn_proto::{CommandBuffer, Session, SessionEnd};
use pn_solver::{Backend, DenseBackend, DensifyBackend, SparseBackend};

fn run_script(script: Vec<u8>, backend: Box<dyn Backend>) -> (SessionEnd, Vec<u8>, String) {
    let mut output = Vec::new();
    let mut diag = Vec::new();
    let end = Session::new(Cursor::new(script), &mut output, &mut diag, backend)
        .run()
        .unwrap();
    (end, output, String::from_utf8(diag).unwrap())
}

fn policies() -> Vec<Box<dyn Backend>> {
    vec![
        Box::new(DenseBackend::default()),
        Box::new(SparseBackend),
        Box::new(DensifyBackend::default()),
    ]
}

#[test]
fn two_node_script_solves_under_every_policy() {
    for backend in policies() {
        let name = backend.name();
        let mut buffer = CommandBuffer::new();
        buffer
            .new_model(2, 1)
            .branch(0, 1, 0, 2.0)
            .pressure(0, 10.0)
            .flow(1, 0.0)
            .verify()
            .solve()
            .clear()
            .quit();
        let (end, output, diag) = run_script(buffer.into_bytes(), backend);
        assert_eq!(end, SessionEnd::Quit, "{name}");
        assert!(diag.is_empty(), "{name}: {diag}");

        let mut cursor = Cursor::new(output);
        assert!(read_status(&mut cursor).unwrap(), "{name}: verify");
        assert!(read_status(&mut cursor).unwrap(), "{name}: solve");
        let pressures = read_pressures(&mut cursor, 2).unwrap();
        let tol = Tolerances::default();
        assert!(nearly_equal(pressures[0], 10.0, tol), "{name}");
        assert!(nearly_equal(pressures[1], 10.0, tol), "{name}");
    }
}

#[test]
fn solve_response_bytes_are_little_endian() {
    let mut buffer = CommandBuffer::new();
    buffer
        .new_model(1, 0)
        .pressure(0, 10.0)
        .solve()
        .quit();
    let (end, output, _) = run_script(buffer.into_bytes(), Box::new(DenseBackend::default()));
    assert_eq!(end, SessionEnd::Quit);

    // status word 1, then 10.0 as IEEE-754 little-endian
    let mut expected = vec![1, 0, 0, 0];
    expected.extend_from_slice(&10.0_f64.to_le_bytes());
    assert_eq!(output, expected);
}

#[test]
fn dangling_component_script_reports_a_numerical_failure() {
    for backend in policies() {
        let name = backend.name();
        let mut buffer = CommandBuffer::new();
        buffer
            .new_model(4, 2)
            .branch(0, 1, 0, 1.0)
            .branch(2, 3, 1, 1.0)
            .pressure(0, 1.0)
            .set_default()
            .verify()
            .solve()
            .quit();
        let (end, output, diag) = run_script(buffer.into_bytes(), backend);
        assert_eq!(end, SessionEnd::Quit, "{name}");
        assert!(diag.contains("linear algebra failure"), "{name}: {diag}");

        let mut cursor = Cursor::new(output);
        assert!(read_status(&mut cursor).unwrap(), "{name}: verify");
        assert!(!read_status(&mut cursor).unwrap(), "{name}: solve");
    }
}

#[test]
fn branch_redefinition_last_write_wins_on_the_wire() {
    // Redefine branch 0 with a different resistance; the second write wins
    // and the solved pressure drop follows r = 4.
    let mut buffer = CommandBuffer::new();
    buffer
        .new_model(2, 1)
        .branch(0, 1, 0, 2.0)
        .branch(0, 1, 0, 4.0)
        .pressure(0, 10.0)
        .flow(1, -1.0)
        .verify()
        .solve()
        .quit();
    let (end, output, diag) = run_script(buffer.into_bytes(), Box::new(DenseBackend::default()));
    assert_eq!(end, SessionEnd::Quit);
    assert!(diag.is_empty(), "{diag}");

    let mut cursor = Cursor::new(output);
    assert!(read_status(&mut cursor).unwrap());
    assert!(read_status(&mut cursor).unwrap());
    let pressures = read_pressures(&mut cursor, 2).unwrap();
    let tol = Tolerances::default();
    // a unit draw at node 1 across r=4 drops 4 units: p1 = p0 - 4
    assert!(nearly_equal(pressures[0], 10.0, tol));
    assert!(nearly_equal(pressures[1], 6.0, tol));
}
