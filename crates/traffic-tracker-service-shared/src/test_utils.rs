//! Test utilities for handler testing.
//!
//! This module provides fixtures for exercising HTTP handlers against an
//! in-memory document store, plus a store whose operations can be failed
//! individually.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use traffic_tracker_lib::{
    Document, DocumentId, DocumentStore, EqualityFilter, MemoryStore, StoreError, StoreResult,
    StoredDocument, TrafficTracker,
};

use crate::state::AppState;

/// Database name used by test fixtures.
pub const TEST_DATABASE: &str = "traffic_test";

/// Application state backed by a fresh in-memory store.
///
/// The store handle is returned too so tests can inspect or break it.
pub fn memory_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new(TEST_DATABASE));
    let tracker = TrafficTracker::new(store.clone());
    (store, AppState::from_tracker(tracker))
}

/// Application state with no document store configured.
pub fn unconfigured_state() -> AppState {
    AppState::from_tracker(TrafficTracker::without_store())
}

/// Document store whose operations fail on demand.
///
/// Successful operations are delegated to an inner [`MemoryStore`].
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_listing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(TEST_DATABASE),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, operation: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: format!("injected {operation} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.insert(collection, document).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &EqualityFilter,
        limit: usize,
    ) -> StoreResult<Vec<StoredDocument>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.find(collection, filter, limit).await
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        Self::check(&self.fail_listing, "listing")?;
        self.inner.list_collection_names().await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    fn database_name(&self) -> Option<&str> {
        self.inner.database_name()
    }
}

/// Application state backed by a [`FlakyStore`].
pub fn flaky_state() -> (Arc<FlakyStore>, AppState) {
    let store = Arc::new(FlakyStore::new());
    let tracker = TrafficTracker::new(store.clone());
    (store, AppState::from_tracker(tracker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_state_has_store() {
        let (_, state) = memory_state();
        assert!(state.tracker().has_store());
    }

    #[test]
    fn test_unconfigured_state_has_no_store() {
        assert!(!unconfigured_state().tracker().has_store());
    }

    #[tokio::test]
    async fn test_flaky_store_fails_only_selected_operations() {
        let store = FlakyStore::new();
        store.fail_writes(true);

        assert!(store.insert("c", Document::new()).await.is_err());
        assert!(store.find("c", &EqualityFilter::new(), 1).await.is_ok());
        assert!(store.ping().await.is_ok());

        store.fail_writes(false);
        assert!(store.insert("c", Document::new()).await.is_ok());
    }
}
