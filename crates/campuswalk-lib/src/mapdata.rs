//! Raw map data as delivered by the map data provider.
//!
//! The provider hands over a finite, already-geolocated street network as a
//! JSON document:
//!
//! ```json
//! {
//!   "nodes": [{ "id": 1, "lat": 22.3149, "lon": 87.3105 }],
//!   "edges": [{ "u": 1, "v": 2, "length": 84.2, "name": ["Main Road", "NH6"] }]
//! }
//! ```
//!
//! `length` may be omitted, in which case the loader derives it from the
//! endpoint coordinates. `name` may be absent, `null`, a single string, or an
//! ordered list of aliases. Nothing in this module validates graph
//! consistency; that happens when the records are turned into a
//! [`Graph`](crate::graph::Graph).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{NodeId, StreetName};

/// Node record from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Street name field as it appears in provider data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStreetName {
    Single(String),
    Aliases(Vec<String>),
}

impl From<Option<RawStreetName>> for StreetName {
    fn from(value: Option<RawStreetName>) -> Self {
        match value {
            None => StreetName::unnamed(),
            Some(RawStreetName::Single(name)) => StreetName::new(vec![name]),
            Some(RawStreetName::Aliases(names)) => StreetName::new(names),
        }
    }
}

/// Edge record from the provider. Endpoints are unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub u: NodeId,
    pub v: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<RawStreetName>,
}

/// Complete provider payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl MapData {
    /// Parse a provider payload from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read provider map data from a JSON file.
pub fn load_map(path: &Path) -> Result<MapData> {
    if !path.exists() {
        return Err(Error::MapNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let map: MapData = serde_json::from_reader(reader)?;
    debug!(
        path = %path.display(),
        nodes = map.nodes.len(),
        edges = map.edges.len(),
        "read map data"
    );
    Ok(map)
}
