use criterion::{criterion_group, criterion_main, Criterion};
use campuswalk_lib::{
    build_graph, plan_walk, shortest_path, Coordinate, DirectionOptions, Graph, MapData, RawEdge,
    RawNode, RawStreetName, SpatialIndex,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

const GRID: i64 = 60;
const SPACING_DEG: f64 = 0.0002;

/// Street grid with slightly skewed rows so the KD-tree is exercised.
fn grid_map() -> MapData {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            let id = row * GRID + col;
            nodes.push(RawNode {
                id,
                lat: 22.30 + row as f64 * SPACING_DEG + col as f64 * 1e-7,
                lon: 87.30 + col as f64 * SPACING_DEG + row as f64 * 1e-7,
            });
            if col + 1 < GRID {
                edges.push(RawEdge {
                    u: id,
                    v: id + 1,
                    length: None,
                    name: Some(RawStreetName::Single(format!("Row {row} Road"))),
                });
            }
            if row + 1 < GRID {
                edges.push(RawEdge {
                    u: id,
                    v: id + GRID,
                    length: None,
                    name: None,
                });
            }
        }
    }
    MapData { nodes, edges }
}

static GRAPH: Lazy<Graph> = Lazy::new(|| build_graph(&grid_map()).expect("grid builds"));
static INDEX: Lazy<SpatialIndex> = Lazy::new(|| SpatialIndex::build(&GRAPH));

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRAPH;
    let index = &*INDEX;
    let corner = 0;
    let opposite = GRID * GRID - 1;

    c.bench_function("dijkstra_grid_corner_to_corner", |b| {
        b.iter(|| {
            let plan = shortest_path(graph, corner, opposite).expect("route exists");
            black_box(plan.hops())
        });
    });

    c.bench_function("nearest_node_grid", |b| {
        let query = Coordinate::new(22.3051, 87.3077);
        b.iter(|| black_box(index.nearest(query).expect("non-empty")));
    });

    c.bench_function("plan_walk_grid", |b| {
        let source = Coordinate::new(22.3001, 87.3001);
        let target = Coordinate::new(22.3110, 87.3090);
        b.iter(|| {
            let plan = plan_walk(graph, index, source, target, DirectionOptions::default())
                .expect("route exists");
            black_box(plan.directions.len())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
