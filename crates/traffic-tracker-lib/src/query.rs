//! Reading recent traffic events back.

use crate::error::QueryError;
use crate::event::{TrafficEvent, EVENT_COLLECTION};
use crate::store::{DocumentStore, EqualityFilter};

/// Number of events returned when the caller gives no limit.
pub const DEFAULT_LIMIT: usize = 50;

/// Upper bound on a single read.
pub const MAX_LIMIT: usize = 500;

/// Filters and bounds for [`list_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub path: Option<String>,
    pub event: Option<String>,
    pub limit: usize,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            path: None,
            event: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl EventQuery {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Reject limits outside `1..=MAX_LIMIT`.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(QueryError::InvalidLimit {
                limit: self.limit,
                max: MAX_LIMIT,
            });
        }
        Ok(())
    }

    /// Equality filter over `path` and `event`. Empty values add no clause.
    pub fn filter(&self) -> EqualityFilter {
        EqualityFilter::new()
            .with_optional("path", non_empty(self.path.as_deref()))
            .with_optional("event", non_empty(self.event.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Fetch recent events matching an already validated `query`, newest first.
///
/// Fails as a whole if any record cannot be read or decoded.
pub(crate) async fn list_events(
    store: &dyn DocumentStore,
    query: &EventQuery,
) -> Result<Vec<TrafficEvent>, QueryError> {
    let documents = store
        .find(EVENT_COLLECTION, &query.filter(), query.limit)
        .await?;

    documents
        .into_iter()
        .map(TrafficEvent::from_stored)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use serde_json::json;

    #[test]
    fn default_query_has_default_limit_and_no_filter() {
        let query = EventQuery::default();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.filter().is_empty());
        assert!(query.validate().is_ok());
    }

    #[test]
    fn filter_includes_only_present_fields() {
        let query = EventQuery::default().with_event("click");
        let filter = query.filter();
        let clauses: Vec<_> = filter.iter().collect();
        assert_eq!(clauses, vec![("event", "click")]);

        let query = EventQuery::default().with_path("/x").with_event("view");
        assert_eq!(query.filter().len(), 2);
    }

    #[test]
    fn empty_strings_are_not_filters() {
        let query = EventQuery::default().with_path("").with_event("");
        assert!(query.filter().is_empty());
    }

    #[test]
    fn limit_bounds_are_enforced() {
        assert!(EventQuery::default().with_limit(1).validate().is_ok());
        assert!(EventQuery::default().with_limit(MAX_LIMIT).validate().is_ok());

        let err = EventQuery::default().with_limit(0).validate().unwrap_err();
        assert!(err.is_validation());

        let err = EventQuery::default()
            .with_limit(MAX_LIMIT + 1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 500"));
    }

    #[tokio::test]
    async fn list_events_decodes_newest_first() {
        let store = MemoryStore::default();
        for path in ["/a", "/b"] {
            let Some(doc) = json!({ "path": path, "event": "view" }).as_object().cloned() else {
                panic!("expected object");
            };
            store.insert(EVENT_COLLECTION, doc).await.unwrap();
        }

        let events = list_events(&store, &EventQuery::default()).await.unwrap();
        let paths: Vec<_> = events.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["/b", "/a"]);
    }
}
