use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{Document, DocumentId, DocumentStore, EqualityFilter, StoredDocument};
use crate::error::{StoreError, StoreResult};

/// In-process document store.
///
/// Documents live in insertion order per collection and identifiers are
/// 24-digit hex counters, so they sort the same way MongoDB object ids do.
/// The store can be switched offline to exercise failure paths.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    collections: BTreeMap<String, Vec<StoredDocument>>,
    outage: Option<String>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(MemoryInner::default()),
        }
    }

    /// Make every operation fail with `message` until [`MemoryStore::restore`].
    pub fn set_outage(&self, message: impl Into<String>) {
        self.inner.write().outage = Some(message.into());
    }

    pub fn restore(&self) {
        self.inner.write().outage = None;
    }

    /// Number of documents held in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn check_outage(inner: &MemoryInner) -> StoreResult<()> {
        match &inner.outage {
            Some(message) => Err(StoreError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        let mut inner = self.inner.write();
        Self::check_outage(&inner)?;

        inner.next_id += 1;
        let id = DocumentId::new(format!("{:024x}", inner.next_id));
        let now = Utc::now();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                created_at: Some(now),
                updated_at: Some(now),
                fields: document,
            });

        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &EqualityFilter,
        limit: usize,
    ) -> StoreResult<Vec<StoredDocument>> {
        let inner = self.inner.read();
        Self::check_outage(&inner)?;

        Ok(inner
            .collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .rev()
                    .filter(|doc| filter.matches(&doc.fields))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        let inner = self.inner.read();
        Self::check_outage(&inner)?;
        Ok(inner.collections.keys().cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Self::check_outage(&self.inner.read())
    }

    fn database_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
