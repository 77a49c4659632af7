//! Document store adapter.
//!
//! Hides the concrete storage technology behind a small async trait. Two
//! backends ship with the crate:
//!
//! - [`MongoStore`]: MongoDB via the official driver (production)
//! - [`MemoryStore`]: an in-process store for tests and local development
//!
//! Both backends stamp `created_at`/`updated_at` on insert and return
//! documents newest-first.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreResult;

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{MongoStore, DEFAULT_DATABASE_NAME};

/// Field name used for the insert timestamp.
pub const CREATED_AT: &str = "created_at";

/// Field name used for the last-update timestamp.
pub const UPDATED_AT: &str = "updated_at";

/// A schema-flexible document as handed to the store.
pub type Document = Map<String, Value>;

/// Shared, process-wide store handle.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Identifier assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Equality-only filter over string fields.
///
/// Every clause must match for a document to be selected. No range,
/// full-text or ordering operators exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EqualityFilter {
    clauses: Vec<(String, String)>,
}

impl EqualityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause requiring `field == value`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// Add a clause only when `value` is present.
    pub fn with_optional(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with(field, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.clauses
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    /// Check a document against every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.iter().all(|(field, expected)| {
            matches!(document.get(field), Some(Value::String(actual)) if actual == expected)
        })
    }
}

/// A document read back from the store.
///
/// The identifier and store-managed timestamps are lifted out of the raw
/// document so callers never deal with backend-specific encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fields: Document,
}

/// Storage operations needed by the tracker.
///
/// Implementations must be safe for concurrent use; the handle is shared by
/// every in-flight request.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its newly assigned identifier.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId>;

    /// Return at most `limit` documents matching `filter`, newest first.
    async fn find(
        &self,
        collection: &str,
        filter: &EqualityFilter,
        limit: usize,
    ) -> StoreResult<Vec<StoredDocument>>;

    /// Names of the collections in the database.
    async fn list_collection_names(&self) -> StoreResult<Vec<String>>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Name of the database backing this store, if known.
    fn database_name(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EqualityFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&document(json!({"path": "/a"}))));
        assert!(filter.matches(&Document::new()));
    }

    #[test]
    fn filter_requires_every_clause() {
        let filter = EqualityFilter::new().with("path", "/x").with("event", "view");
        assert_eq!(filter.len(), 2);
        assert!(filter.matches(&document(json!({"path": "/x", "event": "view"}))));
        assert!(!filter.matches(&document(json!({"path": "/x", "event": "click"}))));
        assert!(!filter.matches(&document(json!({"path": "/x"}))));
    }

    #[test]
    fn filter_does_not_match_null_or_non_string() {
        let filter = EqualityFilter::new().with("source", "ad");
        assert!(!filter.matches(&document(json!({"source": null}))));
        assert!(!filter.matches(&document(json!({"source": 1}))));
    }

    #[test]
    fn optional_clause_is_skipped_when_absent() {
        let filter = EqualityFilter::new()
            .with_optional("path", Some("/home"))
            .with_optional("event", None);
        let clauses: Vec<_> = filter.iter().collect();
        assert_eq!(clauses, vec![("path", "/home")]);
    }

    #[test]
    fn document_id_serializes_as_plain_string() {
        let id = DocumentId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        assert_eq!(id.to_string(), "abc123");
    }
}
