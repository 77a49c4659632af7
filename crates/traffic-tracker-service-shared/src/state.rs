//! Application state for the HTTP service.
//!
//! This module provides the shared state structure that axum handlers use to
//! reach the traffic tracker and its document store.

use std::sync::Arc;

use traffic_tracker_lib::store::DEFAULT_DATABASE_NAME;
use traffic_tracker_lib::{MemoryStore, MongoStore, StoreError, TrafficTracker};

use crate::config::{ServiceConfig, StoreBackend};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The document store client could not be created.
    StoreConnect(StoreError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreConnect(e) => write!(f, "failed to connect to document store: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreConnect(e) => Some(e),
        }
    }
}

impl From<StoreError> for AppStateError {
    fn from(err: StoreError) -> Self {
        Self::StoreConnect(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use traffic_tracker_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let report = state.tracker().check_health().await;
///     // ... use report
/// }
///
/// let state = AppState::connect(&ServiceConfig::from_env()).await?;
/// let app = Router::new()
///     .route("/test", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tracker: TrafficTracker,
}

impl AppState {
    /// Build application state from configuration.
    ///
    /// With the `mongo` backend and no `DATABASE_URL`, the state is created
    /// without a store; diagnostics report it and data endpoints fail.
    ///
    /// # Errors
    ///
    /// Returns an `AppStateError` if the store client cannot be created.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let tracker = match (config.store_backend, config.database_url.as_deref()) {
            (StoreBackend::Memory, _) => {
                let name = config.database_name.as_deref().unwrap_or("memory");
                tracing::info!(database = %name, "using in-memory document store");
                TrafficTracker::new(Arc::new(MemoryStore::new(name)))
            }
            (StoreBackend::Mongo, Some(url)) => {
                tracing::info!(
                    database = config.database_name.as_deref().unwrap_or(DEFAULT_DATABASE_NAME),
                    "connecting to document store"
                );
                let store = MongoStore::connect(url, config.database_name.as_deref()).await?;
                TrafficTracker::new(Arc::new(store))
            }
            (StoreBackend::Mongo, None) => {
                tracing::warn!("DATABASE_URL not set, starting without a document store");
                TrafficTracker::without_store()
            }
        };

        Ok(Self::from_tracker(
            tracker.with_database_url_set(config.database_url_set()),
        ))
    }

    /// Create application state from a pre-built tracker.
    ///
    /// This is useful for testing with an in-memory store.
    pub fn from_tracker(tracker: TrafficTracker) -> Self {
        Self {
            inner: Arc::new(AppStateInner { tracker }),
        }
    }

    /// Access the traffic tracker.
    pub fn tracker(&self) -> &TrafficTracker {
        &self.inner.tracker
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("has_store", &self.inner.tracker.has_store())
            .field("database_url_set", &self.inner.tracker.database_url_set())
            .finish()
    }
}
