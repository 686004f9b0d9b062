//! Shared infrastructure for the campus walking-directions HTTP service.
//!
//! This crate provides the HTTP glue around `campuswalk-lib`:
//!
//! - [`AppState`]: Pre-built street graph, spatial index, and geocoder client
//! - [`health`]: Health check handlers for liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking and metrics middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; all routing logic resides in `campuswalk-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON / query                               │
//! │  - Validate coordinates                                     │
//! │  - Call campuswalk-lib APIs                                 │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a fixture-backed state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_geocode_lookup, record_walk_distance,
    record_walk_failed, record_walk_planned, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    failure_reason, from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE,
    PROBLEM_UNKNOWN_LOCATION, PROBLEM_UPSTREAM_UNAVAILABLE,
};
pub use request::{ReverseGeocodeQuery, ShortestPathRequest, Validate};
pub use state::{AppState, AppStateError};
