use netscope_store::{CsrGraph, StoreError, TraversalMode};
use std::io::Write;
use test_log::test;

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# Nodes: 6 Edges: 6").unwrap();
    writeln!(file, "# FromNodeId\tToNodeId").unwrap();
    for (from, to) in [(0, 1), (0, 2), (0, 5), (1, 3), (3, 4), (5, 0)] {
        writeln!(file, "{from}\t{to}").unwrap();
    }
    file.flush().unwrap();

    let graph = CsrGraph::load(file.path()).unwrap();
    let report = graph.report();
    assert_eq!(report.node_count, 6);
    assert_eq!(report.edge_count, 6);
    assert_eq!(report.highest_degree_node, Some(0));
    assert!(report.memory_mb > 0.0);

    let traversal = graph.traverse(0, 2, TraversalMode::BreadthFirst).unwrap();
    assert_eq!(traversal.nodes, vec![0, 1, 2, 5, 3]);
    assert_eq!(
        traversal.edges,
        vec![(0, 1), (0, 2), (0, 5), (1, 3), (5, 0)]
    );
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsrGraph::load(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn file_without_edges() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# only comments").unwrap();
    writeln!(file, "x y").unwrap();
    file.flush().unwrap();

    let err = CsrGraph::load(file.path()).unwrap_err();
    assert!(matches!(err, StoreError::Empty));
}
