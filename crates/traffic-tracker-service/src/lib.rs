//! Traffic tracker HTTP service.
//!
//! Records page views and similar events sent by browsers and exposes them
//! back for reporting.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness banner
//! - `GET /test` - Store diagnostics report
//! - `POST /api/track` - Record a traffic event
//! - `GET /api/stats` - List recorded events, newest first
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe

#![deny(warnings)]

pub mod handlers;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use traffic_tracker_service_shared::{
    AppState, CorsOrigins, MetricsLayer, health_live, health_ready, metrics_handler,
};

/// Default path of the Prometheus scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

/// Build the service router.
///
/// `metrics_path` is where the Prometheus endpoint is mounted.
pub fn build_router(state: AppState, cors: &CorsOrigins, metrics_path: &str) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/test", get(handlers::diagnostics))
        .route("/api/track", post(handlers::track_event))
        .route("/api/stats", get(handlers::stats))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(cors_layer(cors))
        .layer(MetricsLayer)
        .with_state(state)
}

/// Cross-origin policy for browser clients.
///
/// Methods and headers are unrestricted; only the origin set is configurable.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
