use serde::{Deserialize, Serialize};
use tracing::info;

use crate::directions::{extract_directions, DirectionOptions, Instruction};
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{Graph, NodeId};
use crate::path::{shortest_path, RoutePlan};
use crate::spatial::SpatialIndex;

/// Outcome of planning a walk between two GPS positions.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkPlan {
    /// Node the source position snapped to.
    pub source_node: NodeId,
    /// Node the target position snapped to.
    pub target_node: NodeId,
    /// Node coordinates along the walk, source first.
    pub path: Vec<Coordinate>,
    /// Total length in metres, unrounded.
    pub distance: f64,
    pub directions: Vec<Instruction>,
}

impl WalkPlan {
    /// Total distance rounded to two decimals, ties to even.
    pub fn rounded_distance(&self) -> f64 {
        (self.distance * 100.0).round_ties_even() / 100.0
    }
}

/// One direction step as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionStep {
    pub instruction: String,
    pub distance: u64,
}

impl From<&Instruction> for DirectionStep {
    fn from(step: &Instruction) -> Self {
        Self {
            instruction: step.text(),
            distance: step.distance,
        }
    }
}

/// Walk summary as exchanged with clients: `[lat, lon]` pairs, distance in
/// metres to two decimals, and the direction steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSummary {
    pub path: Vec<[f64; 2]>,
    pub distance: f64,
    pub directions: Vec<DirectionStep>,
}

impl From<&WalkPlan> for WalkSummary {
    fn from(plan: &WalkPlan) -> Self {
        Self {
            path: plan.path.iter().map(|c| [c.lat, c.lon]).collect(),
            distance: plan.rounded_distance(),
            directions: plan.directions.iter().map(DirectionStep::from).collect(),
        }
    }
}

/// Snap both positions to the graph, find the shortest walk, and describe it.
pub fn plan_walk(
    graph: &Graph,
    index: &SpatialIndex,
    source: Coordinate,
    target: Coordinate,
    options: DirectionOptions,
) -> Result<WalkPlan> {
    let source_node = index.nearest(source)?;
    let target_node = index.nearest(target)?;

    let plan = shortest_path(graph, source_node, target_node)?;
    let path = positions_of(graph, &plan)?;
    let directions = extract_directions(&path, &plan.edges, options);

    info!(
        source_node,
        target_node,
        hops = plan.hops(),
        distance = plan.distance,
        instructions = directions.len(),
        "planned walk"
    );

    Ok(WalkPlan {
        source_node,
        target_node,
        path,
        distance: plan.distance,
        directions,
    })
}

/// Node coordinates of a plan, after checking its edge list lines up.
fn positions_of(graph: &Graph, plan: &RoutePlan<'_>) -> Result<Vec<Coordinate>> {
    if !plan.is_well_formed() {
        return Err(Error::MalformedPlan {
            nodes: plan.nodes.len(),
            edges: plan.edges.len(),
        });
    }
    plan.nodes
        .iter()
        .map(|id| graph.node(*id).map(|node| node.position))
        .collect()
}
