//! Campus walking directions library.
//!
//! This crate loads a pedestrian street network into an immutable graph,
//! snaps GPS coordinates onto graph nodes, finds shortest walks with
//! Dijkstra's algorithm, and turns those walks into turn-by-turn
//! instructions. Front ends (the HTTP service and the CLI) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod directions;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod graph;
pub mod mapdata;
pub mod path;
pub mod routing;
pub mod spatial;

pub use directions::{
    classify_turn, extract_directions, turn_angle, DirectionOptions, Instruction, Maneuver,
};
pub use error::{Error, Result};
pub use geo::{bearing, haversine_distance, Coordinate};
pub use geocode::{GeocoderConfig, ReverseGeocoder};
pub use graph::{build_graph, Edge, Graph, Node, NodeId, StreetName};
pub use mapdata::{load_map, MapData, RawEdge, RawNode, RawStreetName};
pub use path::{shortest_path, RoutePlan};
pub use routing::{plan_walk, DirectionStep, WalkPlan, WalkSummary};
pub use spatial::SpatialIndex;
