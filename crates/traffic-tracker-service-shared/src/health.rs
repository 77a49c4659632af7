//! Health check handlers for Kubernetes probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses for Kubernetes liveness and readiness probes.

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
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Name of the connected database (for readiness check).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl HealthStatus {
    /// Create a healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            database: None,
        }
    }

    /// Create a ready status with store information.
    pub fn ready(service: &str, version: &str, database: Option<&str>) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            database: database.map(str::to_string),
        }
    }

    /// Create a not-ready status.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            database: None,
        }
    }
}

/// Liveness probe handler.
///
/// Returns 200 OK if the service is running. This is a simple check that does
/// not depend on external resources.
///
/// # Example
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"traffic-tracker-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Returns 200 OK if a document store is configured and answers a ping.
///
/// # Example
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"traffic-tracker-service-shared","version":"0.1.0","database":"traffic"}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let store = match state.tracker().store() {
        Ok(store) => store,
        Err(e) => {
            let status = HealthStatus::not_ready(service, version, &e.to_string());
            return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
        }
    };

    if let Err(e) = store.ping().await {
        tracing::warn!(error = %e, "readiness ping failed");
        let status = HealthStatus::not_ready(service, version, &e.to_string());
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, store.database_name());
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use traffic_tracker_lib::{MemoryStore, TrafficTracker};

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("test-service", "1.0.0");
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "test-service");
        assert_eq!(status.version, "1.0.0");
        assert!(status.database.is_none());
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("test-service", "1.0.0", "no store");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no store"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::alive("tracker", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"service\":\"tracker\""));
        assert!(!json.contains("database")); // skip_serializing_if
    }

    #[tokio::test]
    async fn test_ready_without_store_is_unavailable() {
        let state = AppState::from_tracker(TrafficTracker::without_store());
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ready_with_store_outage_is_unavailable() {
        let store = Arc::new(MemoryStore::new("traffic"));
        store.set_outage("down");
        let state = AppState::from_tracker(TrafficTracker::new(store));
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ready_with_store_is_ok() {
        let store = Arc::new(MemoryStore::new("traffic"));
        let state = AppState::from_tracker(TrafficTracker::new(store));
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
