use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, NodeId};

/// Shortest walk between two graph nodes.
///
/// `edges[i]` connects `nodes[i]` and `nodes[i + 1]`; the edges are borrowed
/// from the graph that produced the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan<'a> {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<&'a Edge>,
    /// Total length in metres.
    pub distance: f64,
}

impl RoutePlan<'_> {
    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn goal(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of street segments walked.
    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    /// Whether the edge list has exactly one entry per consecutive node pair
    /// and each edge joins that pair.
    pub fn is_well_formed(&self) -> bool {
        !self.nodes.is_empty()
            && self.edges.len() + 1 == self.nodes.len()
            && self
                .nodes
                .windows(2)
                .zip(&self.edges)
                .all(|(pair, edge)| edge.connects(pair[0], pair[1]))
    }
}

/// Run Dijkstra's algorithm weighted by segment length.
///
/// Equal-cost frontier entries are expanded in ascending node id order and
/// neighbours are relaxed in graph load order, so identical graphs always
/// yield identical plans.
pub fn shortest_path(graph: &Graph, start: NodeId, goal: NodeId) -> Result<RoutePlan<'_>> {
    graph.node(start)?;
    graph.node(goal)?;

    if start == goal {
        return Ok(RoutePlan {
            nodes: vec![start],
            edges: Vec::new(),
            distance: 0.0,
        });
    }

    let mut distances: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, (NodeId, &Edge)> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == goal {
            let plan = reconstruct_plan(&parents, start, goal, current_distance);
            debug!(
                start,
                goal,
                hops = plan.hops(),
                distance = plan.distance,
                "found shortest path"
            );
            return Ok(plan);
        }

        for (next, edge) in graph.neighbours(entry.node) {
            let next_cost = current_distance + edge.length;
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, (entry.node, edge));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(start, goal, settled = distances.len(), "goal unreachable");
    Err(Error::NoRoute { start, goal })
}

fn reconstruct_plan<'a>(
    parents: &HashMap<NodeId, (NodeId, &'a Edge)>,
    start: NodeId,
    goal: NodeId,
    distance: f64,
) -> RoutePlan<'a> {
    let mut nodes = vec![goal];
    let mut edges = Vec::new();
    let mut current = goal;
    while current != start {
        let Some(&(previous, edge)) = parents.get(&current) else {
            break;
        };
        nodes.push(previous);
        edges.push(edge);
        current = previous;
    }
    nodes.reverse();
    edges.reverse();
    RoutePlan {
        nodes,
        edges,
        distance,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapdata::{MapData, RawEdge, RawNode};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    /// Two components: a diamond 1-2-4 / 1-3-4 plus a tail 4-5, and an
    /// isolated pair 10-11.
    fn sample_graph() -> Graph {
        let nodes = [
            (1, 0.0, 0.0),
            (2, 0.001, 0.0),
            (3, 0.0, 0.001),
            (4, 0.001, 0.001),
            (5, 0.002, 0.001),
            (10, 1.0, 1.0),
            (11, 1.0, 1.001),
        ];
        let edges = [
            (1, 2, 100.0),
            (2, 4, 100.0),
            (1, 3, 90.0),
            (3, 4, 130.0),
            (4, 5, 50.0),
            (1, 4, 500.0),
            (10, 11, 20.0),
        ];
        let map = MapData {
            nodes: nodes
                .iter()
                .map(|&(id, lat, lon)| RawNode { id, lat, lon })
                .collect(),
            edges: edges
                .iter()
                .map(|&(u, v, length)| RawEdge {
                    u,
                    v,
                    length: Some(length),
                    name: None,
                })
                .collect(),
        };
        Graph::load(&map).expect("valid map")
    }

    #[test]
    fn picks_lowest_total_length() {
        let graph = sample_graph();
        let plan = shortest_path(&graph, 1, 5).unwrap();
        assert_eq!(plan.nodes, vec![1, 2, 4, 5]);
        assert_eq!(plan.edges.len(), 3);
        assert!(plan.is_well_formed());
        assert_close(plan.distance, 250.0);
        for (pair, edge) in plan.nodes.windows(2).zip(&plan.edges) {
            assert!(edge.connects(pair[0], pair[1]));
        }
    }

    #[test]
    fn same_start_and_goal_is_single_node() {
        let graph = sample_graph();
        let plan = shortest_path(&graph, 3, 3).unwrap();
        assert_eq!(plan.nodes, vec![3]);
        assert!(plan.edges.is_empty());
        assert_eq!(plan.distance, 0.0);
        assert_eq!(plan.start(), plan.goal());
    }

    #[test]
    fn distance_is_symmetric() {
        let graph = sample_graph();
        for a in [1, 2, 3, 4, 5] {
            for b in [1, 2, 3, 4, 5] {
                let forward = shortest_path(&graph, a, b).unwrap().distance;
                let backward = shortest_path(&graph, b, a).unwrap().distance;
                assert_close(forward, backward);
            }
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let graph = sample_graph();
        let ids = [1, 2, 3, 4, 5];
        for a in ids {
            for b in ids {
                for c in ids {
                    let ac = shortest_path(&graph, a, c).unwrap().distance;
                    let ab = shortest_path(&graph, a, b).unwrap().distance;
                    let bc = shortest_path(&graph, b, c).unwrap().distance;
                    assert!(ac <= ab + bc + 1e-9, "{a}->{c} exceeds via {b}");
                }
            }
        }
    }

    #[test]
    fn disconnected_components_have_no_route() {
        let graph = sample_graph();
        let err = shortest_path(&graph, 1, 11).unwrap_err();
        assert!(matches!(err, Error::NoRoute { start: 1, goal: 11 }));
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let graph = sample_graph();
        assert!(matches!(
            shortest_path(&graph, 1, 99).unwrap_err(),
            Error::NodeNotFound { id: 99 }
        ));
        assert!(matches!(
            shortest_path(&graph, 42, 1).unwrap_err(),
            Error::NodeNotFound { id: 42 }
        ));
    }

    #[test]
    fn repeated_searches_are_identical() {
        let graph = sample_graph();
        let first = shortest_path(&graph, 5, 1).unwrap();
        for _ in 0..10 {
            assert_eq!(shortest_path(&graph, 5, 1).unwrap(), first);
        }
    }

    #[test]
    fn plan_with_mismatched_edge_is_not_well_formed() {
        let graph = sample_graph();
        let mut plan = shortest_path(&graph, 1, 5).unwrap();
        assert!(plan.is_well_formed());
        plan.edges.swap(0, 1);
        assert!(!plan.is_well_formed());
    }

    #[test]
    fn queue_entry_orders_by_cost_then_node() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(9, 1.0));
        heap.push(QueueEntry::new(2, 5.0));
        heap.push(QueueEntry::new(4, 1.0));
        assert_eq!(heap.pop().map(|e| e.node), Some(4));
        assert_eq!(heap.pop().map(|e| e.node), Some(9));
        assert_eq!(heap.pop().map(|e| e.node), Some(2));
    }
}
