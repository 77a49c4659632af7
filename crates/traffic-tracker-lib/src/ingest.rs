//! Event ingestion: validate, enrich with request metadata, persist.

use std::net::IpAddr;

use crate::error::{IngestionError, StoreError};
use crate::event::{NewTrafficEvent, DEFAULT_EVENT, EVENT_COLLECTION};
use crate::store::{DocumentId, DocumentStore};

/// Caller-supplied part of a tracking call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInput {
    pub path: String,
    /// Defaults to [`DEFAULT_EVENT`] when `None`.
    pub event: Option<String>,
    pub source: Option<String>,
}

impl TrackInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Transport-level facts about the request that carried the event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Value of the `User-Agent` header.
    pub user_agent: Option<String>,
    /// Raw value of the `X-Forwarded-For` header.
    pub forwarded_for: Option<String>,
    /// Address of the connected peer.
    pub peer_addr: Option<IpAddr>,
}

impl RequestMetadata {
    /// Client address: `X-Forwarded-For` verbatim, else the peer address.
    ///
    /// An empty forwarded header counts as absent.
    pub fn client_ip(&self) -> Option<String> {
        self.forwarded_for
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| self.peer_addr.map(|addr| addr.to_string()))
    }
}

/// Validate the input and derive the record to persist.
pub fn build_event(
    input: TrackInput,
    metadata: &RequestMetadata,
) -> Result<NewTrafficEvent, IngestionError> {
    if input.path.trim().is_empty() {
        return Err(IngestionError::MissingPath);
    }

    let event = match input.event {
        Some(event) if event.trim().is_empty() => return Err(IngestionError::EmptyEvent),
        Some(event) => event,
        None => DEFAULT_EVENT.to_string(),
    };

    Ok(NewTrafficEvent {
        path: input.path,
        event,
        source: input.source,
        user_agent: metadata.user_agent.clone(),
        ip: metadata.client_ip(),
    })
}

/// Insert an already validated event into the event collection.
pub async fn persist(
    store: &dyn DocumentStore,
    event: &NewTrafficEvent,
) -> Result<DocumentId, IngestionError> {
    let document = event.to_document().map_err(StoreError::from)?;
    let id = store.insert(EVENT_COLLECTION, document).await?;

    tracing::debug!(id = %id, path = %event.path, event = %event.event, "traffic event stored");
    Ok(id)
}
