//! Traffic tracker library entry points.
//!
//! This crate records traffic events (page views and similar interactions)
//! into a document store and reads them back. Higher-level consumers (the HTTP
//! service) should only depend on the items exported here instead of talking
//! to the store directly.
//!
//! - [`store`]: the document store adapter trait and its backends
//! - [`event`]: the traffic event schema
//! - [`ingest`] / [`query`]: recording and reading events
//! - [`diagnostics`]: never-failing store health probes
//! - [`TrafficTracker`]: facade bundling the above around one store handle

#![deny(warnings)]

pub mod diagnostics;
pub mod error;
pub mod event;
pub mod ingest;
pub mod query;
pub mod store;
mod tracker;

pub use diagnostics::{check_health, ConnectionStatus, DiagnosticsReport};
pub use error::{IngestionError, QueryError, StoreError, StoreResult};
pub use event::{NewTrafficEvent, TrafficEvent, DEFAULT_EVENT, EVENT_COLLECTION};
pub use ingest::{RequestMetadata, TrackInput};
pub use query::{EventQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use store::{
    Document, DocumentId, DocumentStore, EqualityFilter, MemoryStore, MongoStore, SharedStore,
    StoredDocument,
};
pub use tracker::TrafficTracker;
