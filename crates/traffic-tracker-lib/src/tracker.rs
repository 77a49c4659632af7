//! The tracker facade handed to HTTP handlers.

use crate::diagnostics::{self, DiagnosticsReport};
use crate::error::{IngestionError, QueryError, StoreError};
use crate::event::TrafficEvent;
use crate::ingest::{self, RequestMetadata, TrackInput};
use crate::query::{self, EventQuery};
use crate::store::{DocumentId, DocumentStore, SharedStore};

/// Entry point for ingestion, queries and diagnostics.
///
/// The store handle is injected at construction. A tracker without a store is
/// valid: ingestion and queries then fail with [`StoreError::NotInitialized`]
/// while diagnostics report the missing store.
#[derive(Clone)]
pub struct TrafficTracker {
    store: Option<SharedStore>,
    database_url_set: bool,
}

impl TrafficTracker {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store: Some(store),
            database_url_set: true,
        }
    }

    pub fn without_store() -> Self {
        Self {
            store: None,
            database_url_set: false,
        }
    }

    /// Record whether a connection string was configured, for diagnostics.
    pub fn with_database_url_set(mut self, set: bool) -> Self {
        self.database_url_set = set;
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn database_url_set(&self) -> bool {
        self.database_url_set
    }

    pub fn store(&self) -> Result<&dyn DocumentStore, StoreError> {
        self.store.as_deref().ok_or(StoreError::NotInitialized)
    }

    /// Validate, enrich and persist one event.
    ///
    /// Input is validated before the store is consulted, so bad input is
    /// reported as such even when no store is configured.
    pub async fn track(
        &self,
        input: TrackInput,
        metadata: &RequestMetadata,
    ) -> Result<DocumentId, IngestionError> {
        let event = ingest::build_event(input, metadata)?;
        ingest::persist(self.store()?, &event).await
    }

    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<TrafficEvent>, QueryError> {
        query.validate()?;
        query::list_events(self.store()?, query).await
    }

    pub async fn check_health(&self) -> DiagnosticsReport {
        diagnostics::check_health(self.store.as_deref(), self.database_url_set).await
    }
}

impl std::fmt::Debug for TrafficTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrafficTracker")
            .field(
                "database",
                &self.store.as_ref().and_then(|s| s.database_name()),
            )
            .field("database_url_set", &self.database_url_set)
            .finish()
    }
}
