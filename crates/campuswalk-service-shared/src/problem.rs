//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Every failure the service reports uses this shape, with one problem type
//! per failure class. See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use campuswalk_lib::Error as LibError;

/// Problem type URI for malformed or out-of-range request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for destinations that cannot be reached on foot.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for coordinates that cannot be snapped to the map.
pub const PROBLEM_UNKNOWN_LOCATION: &str = "/problems/unknown-location";

/// Problem type URI for failures of an upstream provider such as the geocoder.
pub const PROBLEM_UPSTREAM_UNAVAILABLE: &str = "/problems/upstream-unavailable";

/// Problem type URI for a service whose map data is not available.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use campuswalk_service_shared::{ProblemDetails, PROBLEM_ROUTE_NOT_FOUND};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_ROUTE_NOT_FOUND,
///     "Route Not Found",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("No walking route exists between node 1 and node 21")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found when the snapped nodes are not connected.
    pub fn route_not_found(
        start: campuswalk_lib::NodeId,
        goal: campuswalk_lib::NodeId,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!(
            "No walking route exists between node {start} and node {goal}"
        ))
        .with_request_id(request_id)
    }

    /// 503 when coordinates cannot be resolved because the map has no nodes.
    pub fn unknown_location(request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_LOCATION,
            "Unknown Location",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail("The map has no nodes to resolve coordinates against")
        .with_request_id(request_id)
    }

    /// 502 when an upstream provider failed.
    pub fn upstream_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_UNAVAILABLE,
            "Upstream Unavailable",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 when the map data itself is unusable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::NoRoute { start, goal } => {
            ProblemDetails::route_not_found(*start, *goal, request_id)
        }
        LibError::EmptyIndex => ProblemDetails::unknown_location(request_id),
        LibError::Geocoder { message } => ProblemDetails::upstream_unavailable(
            format!("Reverse geocoding failed: {message}"),
            request_id,
        ),
        LibError::Http(_) => {
            ProblemDetails::upstream_unavailable("Reverse geocoding failed", request_id)
        }
        _ if error.is_fatal() => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

/// Short metric label describing why a library call failed.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::NoRoute { .. } => "no_route",
        LibError::EmptyIndex => "unknown_location",
        LibError::Geocoder { .. } | LibError::Http(_) => "upstream",
        _ => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert_eq!(problem.title, "Route Not Found");
        assert_eq!(problem.status, 404);
        assert!(problem.detail.is_none());
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_into_response_sets_problem_content_type() {
        let response = ProblemDetails::unknown_location("req-1").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[test]
    fn test_each_failure_class_has_distinct_problem() {
        let no_route = from_lib_error(&LibError::NoRoute { start: 1, goal: 21 }, "r");
        let empty = from_lib_error(&LibError::EmptyIndex, "r");
        let upstream = from_lib_error(
            &LibError::Geocoder {
                message: "timed out".into(),
            },
            "r",
        );

        assert_eq!(no_route.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert_eq!(no_route.status, 404);
        assert!(no_route.detail.as_deref().unwrap().contains("21"));

        assert_eq!(empty.type_uri, PROBLEM_UNKNOWN_LOCATION);
        assert_eq!(empty.status, 503);

        assert_eq!(upstream.type_uri, PROBLEM_UPSTREAM_UNAVAILABLE);
        assert_eq!(upstream.status, 502);
        assert!(upstream.detail.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_contract_violations_are_internal() {
        let problem = from_lib_error(&LibError::NodeNotFound { id: 5 }, "r");
        assert_eq!(problem.type_uri, PROBLEM_INTERNAL_ERROR);
        assert_eq!(problem.status, 500);

        let problem = from_lib_error(&LibError::MalformedPlan { nodes: 3, edges: 1 }, "r");
        assert_eq!(problem.status, 500);
    }

    #[test]
    fn test_fatal_map_errors_are_unavailable() {
        for error in [
            LibError::EmptyMap,
            LibError::InvalidMapData {
                message: "bad lat".into(),
            },
            LibError::Io(std::io::Error::other("disk gone")),
        ] {
            assert!(error.is_fatal());
            let problem = from_lib_error(&error, "r");
            assert_eq!(problem.type_uri, PROBLEM_SERVICE_UNAVAILABLE);
            assert_eq!(problem.status, 503);
        }
    }

    #[test]
    fn test_failure_reason_labels() {
        assert_eq!(
            failure_reason(&LibError::NoRoute { start: 1, goal: 2 }),
            "no_route"
        );
        assert_eq!(failure_reason(&LibError::EmptyIndex), "unknown_location");
        assert_eq!(
            failure_reason(&LibError::NodeNotFound { id: 1 }),
            "internal_error"
        );
    }
}
