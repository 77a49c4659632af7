//! Shared infrastructure for the traffic tracker HTTP service.
//!
//! This crate provides the HTTP glue around `traffic-tracker-lib`:
//!
//! - [`AppState`]: The traffic tracker and its document store, shared by handlers
//! - [`ServiceConfig`]: Port, store and CORS settings from the environment
//! - [`health`]: Health check handlers for Kubernetes liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking and metrics middleware
//! - Request types for each endpoint, plus the client details extractor
//!
//! # Architecture
//!
//! Handlers are thin. All storage and validation rules live in
//! `traffic-tracker-lib`; this crate only adapts them to HTTP:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON / query string                        │
//! │  - Call TrafficTracker                                      │
//! │  - Format response or problem details                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides in-memory state and a failure-injecting
//! store for handler testing. Enable the `test-utils` feature to access it
//! from dependent crates.

#![deny(warnings)]

pub mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{CorsOrigins, ServiceConfig, StoreBackend, DEFAULT_PORT};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_event_tracked, record_events_returned,
    record_track_failed, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, UNMATCHED_ROUTE};
pub use problem::{
    from_ingestion_error, from_query_error, ProblemDetails, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST,
};
pub use request::{ClientInfo, StatsQuery, TrackRequest, FORWARDED_FOR_HEADER};
pub use state::{AppState, AppStateError};
