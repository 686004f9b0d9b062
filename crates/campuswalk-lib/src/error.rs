use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the campuswalk library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Map data could not be located at the resolved path.
    #[error("map data not found at {path}")]
    MapNotFound { path: PathBuf },

    /// Raised when the map data yields no nodes at all.
    #[error("map data contains no nodes")]
    EmptyMap,

    /// Raised when an edge references a node that is not part of the map.
    #[error("edge {from} -> {to} references unknown node {missing}")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// Raised when a node or edge record carries unusable values.
    #[error("invalid map data: {message}")]
    InvalidMapData { message: String },

    /// Raised when a node identifier is not part of the graph.
    #[error("node {id} not found in graph")]
    NodeNotFound { id: NodeId },

    /// Raised when the destination cannot be reached from the source.
    #[error("no route found between node {start} and node {goal}")]
    NoRoute { start: NodeId, goal: NodeId },

    /// Raised when a nearest-node query runs against an index without nodes.
    #[error("spatial index is empty; no nodes to snap to")]
    EmptyIndex,

    /// Raised when a route plan's node and edge sequences disagree in length.
    #[error("malformed route plan: {nodes} nodes but {edges} edges")]
    MalformedPlan { nodes: usize, edges: usize },

    /// Raised when the reverse geocoding service fails or answers unexpectedly.
    #[error("reverse geocoding failed: {message}")]
    Geocoder { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether the error means the map cannot be served at all.
    ///
    /// Fatal errors abort startup; everything else is reported per request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MapNotFound { .. }
                | Error::EmptyMap
                | Error::DanglingEdge { .. }
                | Error::InvalidMapData { .. }
                | Error::EmptyIndex
                | Error::Json(_)
                | Error::Io(_)
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidMapData {
            message: message.into(),
        }
    }
}
