//! Campus walking-directions HTTP service.
//!
//! # Endpoints
//!
//! - `POST /shortest-path` - Shortest walk and turn-by-turn directions
//! - `GET /reverse-geocode?lat=&lon=` - Place name for a coordinate
//! - `GET /metrics` - Prometheus metrics endpoint (path configurable)
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//!
//! # Configuration
//!
//! - `CAMPUSWALK_MAP_PATH` - Map JSON file (default: `/data/campus_map.json`)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `GEOCODER_ENABLED` - Set to `false` to disable reverse geocoding
//! - `GEOCODER_URL` - Nominatim base URL
//! - `GEOCODER_USER_AGENT` - User agent sent to the geocoder
//! - `GEOCODER_TIMEOUT_SECS` - Geocoder request timeout (default: 10)
//! - `METRICS_ENABLED`, `METRICS_PATH` - See [`MetricsConfig`]
//! - `RUST_LOG`, `LOG_FORMAT` - See [`campuswalk_service_shared::LoggingConfig`]

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use campuswalk_lib::{plan_walk, GeocoderConfig, ReverseGeocoder, WalkSummary};
use campuswalk_service_shared::{
    failure_reason, from_lib_error, health_live, health_ready, metrics_handler,
    record_geocode_lookup, record_walk_distance, record_walk_failed, record_walk_planned,
    AppState, MetricsConfig, MetricsLayer, ProblemDetails, RequestId, ReverseGeocodeQuery,
    ShortestPathRequest, Validate,
};

/// Service name used in logs and metric labels.
pub const SERVICE_NAME: &str = "campuswalk";

/// Place name reported when the geocoder has no result.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub map_path: PathBuf,
    pub port: u16,
    /// `None` disables reverse geocoding.
    pub geocoder: Option<GeocoderConfig>,
    pub metrics: MetricsConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let map_path = lookup("CAMPUSWALK_MAP_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "/data/campus_map.json".to_string())
            .into();
        let port = lookup("SERVICE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(8080);

        let geocoder_enabled = lookup("GEOCODER_ENABLED")
            .map(|v| v.trim().to_lowercase() != "false")
            .unwrap_or(true);
        let geocoder = geocoder_enabled.then(|| {
            let defaults = GeocoderConfig::default();
            GeocoderConfig {
                base_url: lookup("GEOCODER_URL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or(defaults.base_url),
                user_agent: lookup("GEOCODER_USER_AGENT")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or(defaults.user_agent),
                timeout: lookup("GEOCODER_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            }
        });

        Self {
            map_path,
            port,
            geocoder,
            metrics: MetricsConfig::from_lookup(&lookup),
        }
    }
}

/// Build the service router around `state`.
pub fn app(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/shortest-path", post(shortest_path_handler))
        .route("/reverse-geocode", get(reverse_geocode_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP response - either success or RFC 9457 error.
enum ApiResponse<T> {
    Success(T),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(data) => Json(data).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// Handle `POST /shortest-path`.
async fn shortest_path_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<ShortestPathRequest>, JsonRejection>,
) -> ApiResponse<WalkSummary> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            record_walk_failed("validation_error", SERVICE_NAME);
            return ApiResponse::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_walk_failed("validation_error", SERVICE_NAME);
        return ApiResponse::Error(*problem);
    }

    let plan = match plan_walk(
        state.graph(),
        state.spatial_index(),
        request.source,
        request.target,
        request.direction_options(),
    ) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "walk planning failed");
            record_walk_failed(failure_reason(&e), SERVICE_NAME);
            return ApiResponse::Error(from_lib_error(&e, request_id.as_str()));
        }
    };

    let summary = WalkSummary::from(&plan);
    record_walk_planned(SERVICE_NAME);
    record_walk_distance(plan.distance);

    info!(
        request_id = %request_id,
        source_node = plan.source_node,
        target_node = plan.target_node,
        distance = summary.distance,
        instructions = summary.directions.len(),
        "walk computed successfully"
    );

    ApiResponse::Success(summary)
}

#[derive(Debug, Serialize)]
struct PlaceName {
    name: String,
}

/// Handle `GET /reverse-geocode`.
async fn reverse_geocode_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<ReverseGeocodeQuery>, QueryRejection>,
) -> ApiResponse<PlaceName> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return ApiResponse::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    if let Err(problem) = query.validate(request_id.as_str()) {
        return ApiResponse::Error(*problem);
    }

    let Some(geocoder) = state.geocoder() else {
        record_geocode_lookup("disabled");
        return ApiResponse::Error(ProblemDetails::service_unavailable(
            "Reverse geocoding is not configured",
            request_id.as_str(),
        ));
    };

    match geocoder.reverse(query.coordinate()).await {
        Ok(Some(name)) => {
            record_geocode_lookup("found");
            ApiResponse::Success(PlaceName { name })
        }
        Ok(None) => {
            record_geocode_lookup("unknown");
            ApiResponse::Success(PlaceName {
                name: UNKNOWN_LOCATION.to_string(),
            })
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "reverse geocoding failed");
            record_geocode_lookup("error");
            ApiResponse::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Build the geocoder client described by `config`, if any.
pub fn build_geocoder(
    config: Option<&GeocoderConfig>,
) -> campuswalk_lib::Result<Option<ReverseGeocoder>> {
    config.cloned().map(ReverseGeocoder::new).transpose()
}
