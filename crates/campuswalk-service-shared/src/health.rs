//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Graph nodes loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,

    /// Graph edges loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges_loaded: Option<usize>,

    /// Whether reverse geocoding is configured (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoder_configured: Option<bool>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
            edges_loaded: None,
            geocoder_configured: None,
        }
    }

    pub fn ready(service: &str, version: &str, nodes: usize, edges: usize, geocoder: bool) -> Self {
        Self {
            nodes_loaded: Some(nodes),
            edges_loaded: Some(edges),
            geocoder_configured: Some(geocoder),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"campuswalk-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Not ready while the graph holds no nodes.
///
/// ```text
/// GET /health/ready
/// {"status":"ok",...,"nodes_loaded":9,"edges_loaded":8,"geocoder_configured":true}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let graph = state.graph();
    if graph.is_empty() {
        let status = HealthStatus::not_ready(service, version, "no map nodes loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(
        service,
        version,
        graph.node_count(),
        graph.edge_count(),
        state.geocoder().is_some(),
    );
    (StatusCode::OK, Json(status)).into_response()
}
