//! Traffic tracker HTTP microservice.
//!
//! # Configuration
//!
//! - `PORT` - HTTP port (default: 8000)
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0)
//! - `DATABASE_URL` - MongoDB connection string; the service starts without a
//!   store when unset
//! - `DATABASE_NAME` - Database name (default: from the URL, else `traffic`)
//! - `STORE_BACKEND` - `mongo` (default) or `memory`
//! - `CORS_ALLOW_ORIGINS` - Comma-separated origins, or `*` (default)
//! - `RUST_LOG` - Log filter (default: our crates at info, the rest at warn)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_NAME` - Name recorded on log entries (default: traffic-tracker)

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{Instrument, error, info, info_span, warn};

use traffic_tracker_lib::TrafficTracker;
use traffic_tracker_service::build_router;
use traffic_tracker_service_shared::{
    AppState, LoggingConfig, MetricsConfig, ServiceConfig, init_logging, init_metrics,
};

#[tokio::main]
async fn main() -> Result<()> {
    let logging_config = LoggingConfig::from_env();
    init_logging(&logging_config);

    run()
        .instrument(info_span!("service", service = %logging_config.service))
        .await
}

async fn run() -> Result<()> {
    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        port = config.port,
        backend = ?config.store_backend,
        database_url_set = config.database_url_set(),
        "starting traffic tracker"
    );

    // A store that cannot be reached at startup must not keep the API down;
    // `/test` reports the problem instead.
    let state = match AppState::connect(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "store connection failed, serving without a store");
            AppState::from_tracker(
                TrafficTracker::without_store().with_database_url_set(config.database_url_set()),
            )
        }
    };

    let app = build_router(state, &config.cors_origins, &metrics_config.path);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
