//! Campus walking-directions HTTP service binary.

use std::net::SocketAddr;

use tracing::{error, info};

use campuswalk_service::{app, build_geocoder, ServiceConfig, SERVICE_NAME};
use campuswalk_service_shared::{init_logging, init_metrics, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service(SERVICE_NAME);
    init_logging(&logging_config);

    let config = ServiceConfig::from_env();
    if let Err(e) = init_metrics(&config.metrics) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    info!(
        map_path = %config.map_path.display(),
        port = config.port,
        geocoder = config.geocoder.is_some(),
        "starting walking-directions service"
    );

    let geocoder = build_geocoder(config.geocoder.as_ref()).map_err(|e| {
        error!(error = %e, "failed to build geocoder client");
        e
    })?;

    let state = AppState::load(&config.map_path, geocoder).map_err(|e| {
        error!(error = %e, path = %config.map_path.display(), "failed to load application state");
        e
    })?;

    info!(
        nodes = state.graph().node_count(),
        edges = state.graph().edge_count(),
        "application state loaded"
    );

    let router = app(state, &config.metrics.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
