//! KD-tree spatial index for snapping GPS coordinates onto graph nodes.
//!
//! # Overview
//!
//! The `SpatialIndex` answers "which graph node is closest to this point?" in
//! O(log n) average time. Node coordinates are projected onto a local plane
//! with an equirectangular projection centred on the map, which keeps planar
//! distances within a fraction of a percent of great-circle distances across a
//! single campus. The same projection is used when building and when
//! querying, so distances are always compared like for like.
//!
//! # Ties and duplicates
//!
//! When several nodes are equally close, the lowest node id wins. Nodes that
//! share an exact position are folded into one entry at build time, keeping
//! the lowest id, which also satisfies the tie rule.
//!
//! # Fallback
//!
//! The KD-tree cannot split a bucket whose points all share a value on the
//! split axis. Maps with that many collinear points (synthetic grids, mostly)
//! are served by an exhaustive scan instead. Results are identical either way.
//!
//! # Example
//!
//! ```no_run
//! use campuswalk_lib::{build_graph, load_map, Coordinate, SpatialIndex};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let map = load_map(std::path::Path::new("campus_map.json"))?;
//! let graph = build_graph(&map)?;
//! let index = SpatialIndex::build(&graph);
//!
//! let node = index.nearest(Coordinate::new(22.3149, 87.3105))?;
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::geo::{Coordinate, Equirectangular};
use crate::graph::{Graph, NodeId};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Relative slack (on squared metres) under which two candidates count as
/// equidistant.
const TIE_TOLERANCE: f64 = 1e-12;

type Tree = KdTree<f64, usize, 2, BUCKET_SIZE, u32>;

/// Indexed node: identifier plus projected planar position in metres.
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    node_id: NodeId,
    coords: [f64; 2],
}

/// Nearest-node index over every node of a [`Graph`].
pub struct SpatialIndex {
    projector: Equirectangular,
    entries: Vec<IndexEntry>,
    /// `None` when the index answers queries by exhaustive scan.
    tree: Option<Tree>,
}

impl SpatialIndex {
    /// Build the index over all graph nodes.
    pub fn build(graph: &Graph) -> Self {
        let mut nodes: Vec<_> = graph.nodes().collect();
        nodes.sort_unstable_by_key(|node| node.id);

        let projector = Equirectangular::centred_on(nodes.iter().map(|node| &node.position));

        let mut seen = HashSet::with_capacity(nodes.len());
        let mut entries = Vec::with_capacity(nodes.len());
        for node in nodes {
            let coords = projector.project(node.position);
            // Ascending id order means the first node at a position is the lowest.
            if seen.insert([coords[0].to_bits(), coords[1].to_bits()]) {
                entries.push(IndexEntry {
                    node_id: node.id,
                    coords,
                });
            }
        }

        let tree = if max_shared_axis_value(&entries) >= BUCKET_SIZE {
            warn!(
                nodes = entries.len(),
                "too many collinear nodes for the KD-tree, using exhaustive nearest-node scan"
            );
            None
        } else {
            let mut tree = Tree::new();
            for (index, entry) in entries.iter().enumerate() {
                tree.add(&entry.coords, index);
            }
            Some(tree)
        };

        info!(
            node_count = graph.node_count(),
            indexed_positions = entries.len(),
            kd_tree = tree.is_some(),
            "built spatial index"
        );

        Self {
            projector,
            entries,
            tree,
        }
    }

    /// Number of distinct indexed positions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier of the node closest to `point`.
    ///
    /// Only fails when the index holds no nodes; there is no maximum snapping
    /// distance.
    pub fn nearest(&self, point: Coordinate) -> Result<NodeId> {
        self.nearest_with_distance(point).map(|(id, _)| id)
    }

    /// Closest node together with its planar distance from `point` in metres.
    pub fn nearest_with_distance(&self, point: Coordinate) -> Result<(NodeId, f64)> {
        if self.entries.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let query = self.projector.project(point);
        let (node_id, squared) = match &self.tree {
            Some(tree) => self.nearest_in_tree(tree, &query),
            None => self.nearest_by_scan(&query),
        };
        Ok((node_id, squared.sqrt()))
    }

    fn nearest_in_tree(&self, tree: &Tree, query: &[f64; 2]) -> (NodeId, f64) {
        let Some(best) = tree.nearest_n::<SquaredEuclidean>(query, 1).into_iter().next() else {
            return self.nearest_by_scan(query);
        };
        let limit = best.distance + tie_slack(best.distance);

        // Widen to every candidate within tolerance so ties resolve by id
        // rather than by tree layout.
        tree.within::<SquaredEuclidean>(query, limit)
            .into_iter()
            .map(|neighbour| self.entries[neighbour.item].node_id)
            .chain(std::iter::once(self.entries[best.item].node_id))
            .min()
            .map(|node_id| (node_id, best.distance))
            .unwrap_or((self.entries[best.item].node_id, best.distance))
    }

    fn nearest_by_scan(&self, query: &[f64; 2]) -> (NodeId, f64) {
        let mut best: Option<(NodeId, f64)> = None;
        for entry in &self.entries {
            let distance = squared_distance(&entry.coords, query);
            best = match best {
                None => Some((entry.node_id, distance)),
                Some((best_id, best_distance)) => {
                    let slack = tie_slack(distance.min(best_distance));
                    if distance + slack < best_distance {
                        Some((entry.node_id, distance))
                    } else if (distance - best_distance).abs() <= slack && entry.node_id < best_id
                    {
                        Some((entry.node_id, best_distance.min(distance)))
                    } else {
                        Some((best_id, best_distance))
                    }
                }
            };
        }
        // Callers check for an empty index first.
        best.unwrap_or((NodeId::MIN, f64::INFINITY))
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("indexed_positions", &self.entries.len())
            .field("kd_tree", &self.tree.is_some())
            .field("origin", &self.projector.origin())
            .finish()
    }
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn tie_slack(squared: f64) -> f64 {
    squared.max(1.0) * TIE_TOLERANCE
}

/// Largest number of entries sharing one exact value on either axis.
fn max_shared_axis_value(entries: &[IndexEntry]) -> usize {
    let mut counts: [HashMap<u64, usize>; 2] = [HashMap::new(), HashMap::new()];
    let mut max = 0;
    for entry in entries {
        for (axis, count) in counts.iter_mut().enumerate() {
            let slot = count.entry(entry.coords[axis].to_bits()).or_insert(0);
            *slot += 1;
            max = max.max(*slot);
        }
    }
    max
}
