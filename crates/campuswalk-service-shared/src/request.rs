//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use campuswalk_lib::{Coordinate, DirectionOptions};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /shortest-path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathRequest {
    pub source: Coordinate,
    pub target: Coordinate,

    /// Fold unannounced straight-on legs into the preceding instruction.
    #[serde(default)]
    pub merge_straight_legs: bool,
}

impl ShortestPathRequest {
    pub fn direction_options(&self) -> DirectionOptions {
        DirectionOptions {
            merge_straight_legs: self.merge_straight_legs,
        }
    }
}

impl Validate for ShortestPathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_coordinate("source", self.source, request_id)?;
        check_coordinate("target", self.target, request_id)
    }
}

/// Query string of `GET /reverse-geocode`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

impl ReverseGeocodeQuery {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

impl Validate for ReverseGeocodeQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_coordinate("query", self.coordinate(), request_id)
    }
}

fn check_coordinate(
    field: &str,
    point: Coordinate,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    if point.is_valid() {
        return Ok(());
    }
    Err(Box::new(ProblemDetails::bad_request(
        format!(
            "The '{field}' coordinate must have a finite lat in [-90, 90] and lon in [-180, 180] (got lat={}, lon={})",
            point.lat, point.lon
        ),
        request_id,
    )))
}
