use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::{haversine_distance, Coordinate};
use crate::mapdata::MapData;

/// Numeric identifier for a street-network node.
pub type NodeId = i64;

/// Vertex of the street network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Coordinate,
}

/// Street name attached to an edge: zero or more aliases in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetName(Vec<String>);

impl StreetName {
    /// Name reported for edges without any usable name.
    pub const PLACEHOLDER: &'static str = "Unnamed Path";

    /// Build from aliases, dropping blank entries.
    pub fn new(aliases: Vec<String>) -> Self {
        Self(
            aliases
                .into_iter()
                .filter(|alias| !alias.trim().is_empty())
                .collect(),
        )
    }

    pub fn unnamed() -> Self {
        Self(Vec::new())
    }

    /// The name used in directions: the first alias, or the placeholder.
    pub fn resolve(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or(Self::PLACEHOLDER)
    }

    pub fn aliases(&self) -> &[String] {
        &self.0
    }

    pub fn is_named(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Undirected walkable segment between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Length in metres.
    pub length: f64,
    pub name: StreetName,
}

impl Edge {
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    target: NodeId,
    edge: usize,
}

/// Immutable street graph.
///
/// Built once from [`MapData`] and never mutated afterwards, so a single
/// instance can be shared across threads behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    adjacency: HashMap<NodeId, Vec<Link>>,
}

impl Graph {
    /// Build a graph from provider map data.
    ///
    /// Fails with [`Error::EmptyMap`] when there are no nodes, with
    /// [`Error::DanglingEdge`] when an edge references an unknown node, and
    /// with [`Error::InvalidMapData`] for duplicate node ids, out-of-range
    /// coordinates, or unusable lengths. Parallel edges between the same pair
    /// collapse onto the shortest one; self-loops are dropped.
    pub fn load(map: &MapData) -> Result<Self> {
        if map.nodes.is_empty() {
            return Err(Error::EmptyMap);
        }

        let mut nodes = HashMap::with_capacity(map.nodes.len());
        for raw in &map.nodes {
            let position = Coordinate::new(raw.lat, raw.lon);
            if !position.is_valid() {
                return Err(Error::invalid(format!(
                    "node {} has invalid coordinates ({}, {})",
                    raw.id, raw.lat, raw.lon
                )));
            }
            if nodes
                .insert(raw.id, Node { id: raw.id, position })
                .is_some()
            {
                return Err(Error::invalid(format!("duplicate node id {}", raw.id)));
            }
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(map.edges.len());
        let mut by_pair: HashMap<(NodeId, NodeId), usize> = HashMap::new();
        let mut self_loops = 0usize;
        let mut collapsed = 0usize;

        for raw in &map.edges {
            let (Some(start), Some(end)) = (nodes.get(&raw.u), nodes.get(&raw.v)) else {
                let missing = if nodes.contains_key(&raw.u) {
                    raw.v
                } else {
                    raw.u
                };
                return Err(Error::DanglingEdge {
                    from: raw.u,
                    to: raw.v,
                    missing,
                });
            };

            if raw.u == raw.v {
                self_loops += 1;
                continue;
            }

            let length = match raw.length {
                Some(length) if length.is_finite() && length >= 0.0 => length,
                Some(length) => {
                    return Err(Error::invalid(format!(
                        "edge {} -> {} has invalid length {}",
                        raw.u, raw.v, length
                    )));
                }
                None => haversine_distance(start.position, end.position),
            };

            let edge = Edge {
                a: raw.u,
                b: raw.v,
                length,
                name: raw.name.clone().into(),
            };

            match by_pair.entry(pair_key(raw.u, raw.v)) {
                Entry::Occupied(slot) => {
                    collapsed += 1;
                    let existing = &mut edges[*slot.get()];
                    if edge.length < existing.length {
                        *existing = edge;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(edges.len());
                    edges.push(edge);
                }
            }
        }

        let mut adjacency: HashMap<NodeId, Vec<Link>> = HashMap::with_capacity(nodes.len());
        for (index, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.a).or_default().push(Link {
                target: edge.b,
                edge: index,
            });
            adjacency.entry(edge.b).or_default().push(Link {
                target: edge.a,
                edge: index,
            });
        }

        if self_loops > 0 || collapsed > 0 {
            debug!(self_loops, collapsed, "normalized raw edges");
        }
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            "built street graph"
        );

        Ok(Self {
            nodes,
            edges,
            adjacency,
        })
    }

    /// Look up a node by identifier.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound { id })
    }

    /// Neighbours of `id` together with the connecting edge, in load order.
    ///
    /// Unknown identifiers have no neighbours.
    pub fn neighbours(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Edge)> + '_ {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|link| (link.target, &self.edges[link.edge]))
    }

    /// The retained edge between two adjacent nodes.
    pub fn edge_between(&self, x: NodeId, y: NodeId) -> Option<&Edge> {
        self.neighbours(x)
            .find(|(target, _)| *target == y)
            .map(|(_, edge)| edge)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// South-west and north-east corners of the node extent.
    pub fn bounds(&self) -> Option<(Coordinate, Coordinate)> {
        let mut positions = self.nodes.values().map(|node| node.position);
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| {
            (
                Coordinate::new(min.lat.min(p.lat), min.lon.min(p.lon)),
                Coordinate::new(max.lat.max(p.lat), max.lon.max(p.lon)),
            )
        });
        Some((min, max))
    }
}

/// Build the routing graph from provider data.
pub fn build_graph(map: &MapData) -> Result<Graph> {
    Graph::load(map)
}

fn pair_key(x: NodeId, y: NodeId) -> (NodeId, NodeId) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}
