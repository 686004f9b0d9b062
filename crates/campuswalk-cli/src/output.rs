//! Output formatting for walks, snapped nodes, and map summaries.

use clap::ValueEnum;
use serde::Serialize;

use campuswalk_lib::{Coordinate, Graph, NodeId, WalkPlan, WalkSummary};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Parse `LAT,LON` into a coordinate.
pub fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    let point = Coordinate::new(lat, lon);
    if !point.is_valid() {
        return Err(format!("coordinate {lat},{lon} is out of range"));
    }
    Ok(point)
}

/// Render a planned walk.
pub fn render_walk(plan: &WalkPlan, format: OutputFormat) -> serde_json::Result<String> {
    let summary = WalkSummary::from(plan);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary),
        OutputFormat::Text => {
            let mut lines = vec![format!(
                "Walk from node {} to node {}: {:.2} m",
                plan.source_node, plan.target_node, summary.distance
            )];
            if summary.directions.is_empty() {
                lines.push("You are already there.".to_string());
            }
            for (i, step) in summary.directions.iter().enumerate() {
                lines.push(format!("{:>2}. {} ({} m)", i + 1, step.instruction, step.distance));
            }
            Ok(lines.join("\n"))
        }
    }
}

#[derive(Debug, Serialize)]
struct NearestNode {
    node: NodeId,
    lat: f64,
    lon: f64,
    /// Planar distance from the queried point in metres.
    offset: f64,
}

/// Render the node a point snapped to.
pub fn render_nearest(
    node: NodeId,
    position: Coordinate,
    offset: f64,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&NearestNode {
            node,
            lat: position.lat,
            lon: position.lon,
            offset: (offset * 100.0).round() / 100.0,
        }),
        OutputFormat::Text => Ok(format!(
            "Nearest node {node} at {},{} ({offset:.1} m away)",
            position.lat, position.lon
        )),
    }
}

#[derive(Debug, Serialize)]
struct MapSummary {
    nodes: usize,
    edges: usize,
    named_edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    south_west: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    north_east: Option<[f64; 2]>,
}

impl MapSummary {
    fn of(graph: &Graph) -> Self {
        let bounds = graph.bounds();
        Self {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            named_edges: graph.edges().iter().filter(|e| e.name.is_named()).count(),
            south_west: bounds.map(|(min, _)| [min.lat, min.lon]),
            north_east: bounds.map(|(_, max)| [max.lat, max.lon]),
        }
    }
}

/// Render a short summary of a loaded map.
pub fn render_inspect(graph: &Graph, format: OutputFormat) -> serde_json::Result<String> {
    let summary = MapSummary::of(graph);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary),
        OutputFormat::Text => {
            let mut lines = vec![
                format!("Nodes: {}", summary.nodes),
                format!(
                    "Edges: {} ({} named)",
                    summary.edges, summary.named_edges
                ),
            ];
            if let (Some(sw), Some(ne)) = (summary.south_west, summary.north_east) {
                lines.push(format!(
                    "Bounds: {},{} to {},{}",
                    sw[0], sw[1], ne[0], ne[1]
                ));
            }
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campuswalk_lib::{Instruction, Maneuver};

    fn sample_plan() -> WalkPlan {
        WalkPlan {
            source_node: 1,
            target_node: 3,
            path: vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.001, 0.0),
                Coordinate::new(0.001, 0.001),
            ],
            distance: 180.004,
            directions: vec![
                Instruction {
                    maneuver: Maneuver::Head,
                    street: "Oak St".into(),
                    distance: 100,
                },
                Instruction {
                    maneuver: Maneuver::Right,
                    street: "Pine St".into(),
                    distance: 80,
                },
            ],
        }
    }

    #[test]
    fn parses_lat_lon_pairs() {
        assert_eq!(
            parse_coordinate("22.314, 87.31"),
            Ok(Coordinate::new(22.314, 87.31))
        );
        assert!(parse_coordinate("22.314").is_err());
        assert!(parse_coordinate("north,87.31").is_err());
        assert!(parse_coordinate("95,0").unwrap_err().contains("out of range"));
    }

    #[test]
    fn text_walk_lists_numbered_steps() {
        let text = render_walk(&sample_plan(), OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Walk from node 1 to node 3: 180.00 m\n 1. Head toward Oak St (100 m)\n 2. Turn right onto Pine St (80 m)"
        );
    }

    #[test]
    fn json_walk_uses_client_shape() {
        let json = render_walk(&sample_plan(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["distance"], 180.0);
        assert_eq!(value["path"][2], serde_json::json!([0.001, 0.001]));
        assert_eq!(value["directions"][1]["instruction"], "Turn right onto Pine St");
    }

    #[test]
    fn empty_walk_says_so() {
        let plan = WalkPlan {
            directions: vec![],
            path: vec![Coordinate::new(0.0, 0.0)],
            distance: 0.0,
            ..sample_plan()
        };
        let text = render_walk(&plan, OutputFormat::Text).unwrap();
        assert!(text.ends_with("You are already there."));
    }

    #[test]
    fn nearest_text_mentions_node() {
        let text =
            render_nearest(4, Coordinate::new(22.315, 87.3112), 12.345, OutputFormat::Text).unwrap();
        assert_eq!(text, "Nearest node 4 at 22.315,87.3112 (12.3 m away)");
    }
}
