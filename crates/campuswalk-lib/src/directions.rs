//! Turn-by-turn directions from a walked sequence of street segments.
//!
//! The extractor measures the change of heading at every interior node of a
//! path and turns each noticeable change into an instruction. Near-straight
//! continuations are not announced. The first instruction always tells the
//! walker which street to set off along.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{bearing, Coordinate};
use crate::graph::Edge;

/// Widest heading change, in degrees either way, still treated as going
/// straight on.
pub const STRAIGHT_LIMIT: f64 = 20.0;
/// Widest heading change announced as a slight turn.
pub const SLIGHT_LIMIT: f64 = 65.0;
/// Widest heading change announced as a plain turn; anything sharper is a
/// sharp turn.
pub const TURN_LIMIT: f64 = 135.0;

/// Kind of instruction given to the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maneuver {
    /// Opening instruction of every route.
    Head,
    SlightRight,
    Right,
    SharpRight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl Maneuver {
    pub fn label(self) -> &'static str {
        match self {
            Maneuver::Head => "Head toward",
            Maneuver::SlightRight => "Slight right",
            Maneuver::Right => "Turn right",
            Maneuver::SharpRight => "Sharp right",
            Maneuver::SlightLeft => "Slight left",
            Maneuver::Left => "Turn left",
            Maneuver::SharpLeft => "Sharp left",
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single step of the directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub maneuver: Maneuver,
    /// Resolved street name of the leg.
    pub street: String,
    /// Whole metres to walk along the leg.
    pub distance: u64,
}

impl Instruction {
    /// Human-readable directive, e.g. `Turn right onto Pine St`.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maneuver {
            Maneuver::Head => write!(f, "{} {}", self.maneuver, self.street),
            turn => write!(f, "{} onto {}", turn, self.street),
        }
    }
}

/// Knobs for direction extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionOptions {
    /// Fold the length of unannounced straight-on legs into the preceding
    /// instruction instead of dropping it.
    #[serde(default)]
    pub merge_straight_legs: bool,
}

/// Signed heading change from `incoming` to `outgoing`, in `(-180, 180]`.
///
/// Positive values turn right (clockwise), negative values turn left.
pub fn turn_angle(incoming: f64, outgoing: f64) -> f64 {
    let mut angle = outgoing - incoming;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Classify a signed turn angle. Returns `None` for straight-on.
pub fn classify_turn(angle: f64) -> Option<Maneuver> {
    let maneuver = if angle > TURN_LIMIT {
        Maneuver::SharpRight
    } else if angle > SLIGHT_LIMIT {
        Maneuver::Right
    } else if angle > STRAIGHT_LIMIT {
        Maneuver::SlightRight
    } else if angle >= -STRAIGHT_LIMIT {
        return None;
    } else if angle >= -SLIGHT_LIMIT {
        Maneuver::SlightLeft
    } else if angle >= -TURN_LIMIT {
        Maneuver::Left
    } else {
        Maneuver::SharpLeft
    };
    Some(maneuver)
}

/// Turn a walked path into instructions.
///
/// `positions` holds the node coordinates in walking order and `edges[i]` is
/// the segment between `positions[i]` and `positions[i + 1]`. Fewer than two
/// positions yield no instructions. Legs without a matching position pair are
/// ignored.
///
/// A node that coincides with its predecessor or successor has no defined
/// heading there, so it never produces a turn.
pub fn extract_directions(
    positions: &[Coordinate],
    edges: &[&Edge],
    options: DirectionOptions,
) -> Vec<Instruction> {
    let legs = edges.len().min(positions.len().saturating_sub(1));
    if legs == 0 {
        return Vec::new();
    }

    let mut pending: Vec<(Maneuver, &str, f64)> = Vec::with_capacity(legs);
    pending.push((Maneuver::Head, edges[0].name.resolve(), edges[0].length));

    for i in 1..legs {
        let (previous, current, next) = (positions[i - 1], positions[i], positions[i + 1]);
        let edge = edges[i];

        let maneuver = if previous == current || current == next {
            None
        } else {
            classify_turn(turn_angle(
                bearing(previous, current),
                bearing(current, next),
            ))
        };

        match maneuver {
            Some(maneuver) => pending.push((maneuver, edge.name.resolve(), edge.length)),
            None if options.merge_straight_legs => {
                if let Some(last) = pending.last_mut() {
                    last.2 += edge.length;
                }
            }
            None => {}
        }
    }

    pending
        .into_iter()
        .map(|(maneuver, street, length)| Instruction {
            maneuver,
            street: street.to_string(),
            distance: whole_metres(length),
        })
        .collect()
}

/// Round to whole metres, ties to even.
fn whole_metres(length: f64) -> u64 {
    length.max(0.0).round_ties_even() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StreetName;

    fn edge(a: i64, b: i64, length: f64, name: Option<&str>) -> Edge {
        Edge {
            a,
            b,
            length,
            name: StreetName::new(name.map(str::to_string).into_iter().collect()),
        }
    }

    #[test]
    fn turn_angle_wraps_into_half_open_range() {
        assert_eq!(turn_angle(0.0, 45.0), 45.0);
        assert_eq!(turn_angle(0.0, 200.0), -160.0);
        assert_eq!(turn_angle(350.0, 10.0), 20.0);
        assert_eq!(turn_angle(10.0, 350.0), -20.0);
        assert_eq!(turn_angle(0.0, 180.0), 180.0);
        assert_eq!(turn_angle(180.0, 0.0), 180.0);
    }

    #[test]
    fn slight_right_and_sharp_left() {
        assert_eq!(
            classify_turn(turn_angle(0.0, 45.0)),
            Some(Maneuver::SlightRight)
        );
        assert_eq!(
            classify_turn(turn_angle(0.0, 200.0)),
            Some(Maneuver::SharpLeft)
        );
    }

    #[test]
    fn classification_boundaries() {
        let cases = [
            (0.0, None),
            (20.0, None),
            (-20.0, None),
            (20.5, Some(Maneuver::SlightRight)),
            (65.0, Some(Maneuver::SlightRight)),
            (65.5, Some(Maneuver::Right)),
            (135.0, Some(Maneuver::Right)),
            (135.5, Some(Maneuver::SharpRight)),
            (180.0, Some(Maneuver::SharpRight)),
            (-20.5, Some(Maneuver::SlightLeft)),
            (-65.0, Some(Maneuver::SlightLeft)),
            (-65.5, Some(Maneuver::Left)),
            (-135.0, Some(Maneuver::Left)),
            (-135.5, Some(Maneuver::SharpLeft)),
            (-179.9, Some(Maneuver::SharpLeft)),
        ];
        for (angle, expected) in cases {
            assert_eq!(classify_turn(angle), expected, "angle {angle}");
        }
    }

    #[test]
    fn right_angle_turn_between_two_streets() {
        let positions = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.001, 0.0),
            Coordinate::new(0.001, 0.001),
        ];
        let oak = edge(1, 2, 100.0, Some("Oak St"));
        let pine = edge(2, 3, 80.0, Some("Pine St"));

        let directions = extract_directions(&positions, &[&oak, &pine], DirectionOptions::default());
        let texts: Vec<_> = directions
            .iter()
            .map(|step| (step.text(), step.distance))
            .collect();

        assert_eq!(
            texts,
            vec![
                ("Head toward Oak St".to_string(), 100),
                ("Turn right onto Pine St".to_string(), 80),
            ]
        );
    }

    #[test]
    fn east_then_north_is_a_left_turn() {
        let positions = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.001),
            Coordinate::new(0.001, 0.001),
        ];
        let oak = edge(1, 2, 100.0, Some("Oak St"));
        let pine = edge(2, 3, 80.0, Some("Pine St"));

        let directions = extract_directions(&positions, &[&oak, &pine], DirectionOptions::default());
        let texts: Vec<_> = directions
            .iter()
            .map(|step| (step.text(), step.distance))
            .collect();

        assert_eq!(
            texts,
            vec![
                ("Head toward Oak St".to_string(), 100),
                ("Turn left onto Pine St".to_string(), 80),
            ]
        );
    }

    #[test]
    fn straight_legs_are_suppressed_by_default() {
        let positions = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.001, 0.0),
            Coordinate::new(0.002, 0.00001),
            Coordinate::new(0.002, 0.001),
        ];
        let first = edge(1, 2, 111.4, Some("Main Road"));
        let second = edge(2, 3, 111.2, Some("Main Road"));
        let third = edge(3, 4, 60.5, None);
        let edges = [&first, &second, &third];

        let plain = extract_directions(&positions, &edges, DirectionOptions::default());
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[0].text(), "Head toward Main Road");
        assert_eq!(plain[0].distance, 111);
        assert_eq!(plain[1].text(), "Turn right onto Unnamed Path");
        // 60.5 rounds half to even.
        assert_eq!(plain[1].distance, 60);

        let merged = extract_directions(
            &positions,
            &edges,
            DirectionOptions {
                merge_straight_legs: true,
            },
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].distance, 223);
        assert_eq!(merged[1].distance, 60);
    }

    #[test]
    fn fewer_than_two_positions_yield_nothing() {
        let lone = edge(1, 2, 10.0, Some("Oak St"));
        assert!(extract_directions(&[], &[], DirectionOptions::default()).is_empty());
        assert!(extract_directions(
            &[Coordinate::new(0.0, 0.0)],
            &[&lone],
            DirectionOptions::default()
        )
        .is_empty());
    }

    #[test]
    fn single_leg_gives_only_head_instruction() {
        let positions = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.001)];
        let only = edge(1, 2, 99.5, None);
        let directions = extract_directions(&positions, &[&only], DirectionOptions::default());
        assert_eq!(directions.len(), 1);
        assert_eq!(directions[0].text(), "Head toward Unnamed Path");
        assert_eq!(directions[0].distance, 100);
    }

    #[test]
    fn coincident_nodes_never_turn() {
        let positions = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.001, 0.0),
            Coordinate::new(0.001, 0.0),
            Coordinate::new(0.002, 0.0),
        ];
        let a = edge(1, 2, 111.0, Some("North Walk"));
        let b = edge(2, 3, 0.0, Some("Gate"));
        let c = edge(3, 4, 111.0, Some("North Walk"));
        let directions =
            extract_directions(&positions, &[&a, &b, &c], DirectionOptions::default());
        assert_eq!(directions.len(), 1);
    }

    #[test]
    fn first_alias_names_the_street() {
        let positions = [Coordinate::new(0.0, 0.0), Coordinate::new(0.001, 0.0)];
        let aliased = Edge {
            a: 1,
            b: 2,
            length: 5.0,
            name: StreetName::new(vec!["Scholars Avenue".into(), "SH-5".into()]),
        };
        let directions =
            extract_directions(&positions, &[&aliased], DirectionOptions::default());
        assert_eq!(directions[0].street, "Scholars Avenue");
    }
}
