//! Shared fixture helpers for integration tests.

use std::path::PathBuf;

use campuswalk_lib::{build_graph, load_map, Graph, SpatialIndex};

/// Path to the campus map fixture shared by every crate's tests.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/campus_map.json")
}

/// Load the fixture graph and its spatial index.
pub fn campus() -> (Graph, SpatialIndex) {
    let map = load_map(&fixture_path()).expect("fixture loads");
    let graph = build_graph(&map).expect("fixture builds");
    let index = SpatialIndex::build(&graph);
    (graph, index)
}
