//! Application state for the HTTP service.
//!
//! Holds the street graph and spatial index, built once at startup and shared
//! read-only by every handler, plus the optional reverse geocoding client.

use std::path::Path;
use std::sync::Arc;

use campuswalk_lib::{
    build_graph, load_map, Error as LibError, Graph, ReverseGeocoder, SpatialIndex,
};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Map file not found.
    MapNotFound(String),

    /// Map data could not be read or turned into a graph.
    MapLoad(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MapNotFound(path) => write!(f, "map data not found: {}", path),
            Self::MapLoad(e) => write!(f, "failed to load map data: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MapLoad(e) => Some(e),
            Self::MapNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::MapNotFound { path } => Self::MapNotFound(path.display().to_string()),
            other => Self::MapLoad(other),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use campuswalk_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let graph = state.graph();
///     // ... use graph
/// }
///
/// let state = AppState::load("path/to/campus_map.json", None).unwrap();
/// let app = Router::new()
///     .route("/nodes", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: Graph,
    index: SpatialIndex,
    geocoder: Option<ReverseGeocoder>,
}

impl AppState {
    /// Load the map from `map_path` and build the graph and spatial index.
    ///
    /// Any failure here is fatal: the service cannot answer routing requests
    /// without a graph.
    pub fn load(
        map_path: impl AsRef<Path>,
        geocoder: Option<ReverseGeocoder>,
    ) -> Result<Self, AppStateError> {
        let map_path = map_path.as_ref();

        tracing::info!(path = %map_path.display(), "loading map data");
        let map = load_map(map_path)?;
        let graph = build_graph(&map)?;
        tracing::info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            "street graph loaded successfully"
        );

        Ok(Self::from_components(graph, geocoder))
    }

    /// Create application state from an already built graph.
    ///
    /// The spatial index is built here. Useful for tests and embedding.
    pub fn from_components(graph: Graph, geocoder: Option<ReverseGeocoder>) -> Self {
        let index = SpatialIndex::build(&graph);
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                index,
                geocoder,
            }),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.inner.index
    }

    /// The reverse geocoding client, if one is configured.
    pub fn geocoder(&self) -> Option<&ReverseGeocoder> {
        self.inner.geocoder.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.inner.graph.node_count())
            .field("edge_count", &self.inner.graph.edge_count())
            .field("has_geocoder", &self.inner.geocoder.is_some())
            .finish()
    }
}
