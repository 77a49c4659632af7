//! Store diagnostics.
//!
//! A report is assembled from independent probes. Each probe samples the
//! store and yields a value; none of them can fail the report as a whole.

use serde::{Deserialize, Serialize};

use crate::store::DocumentStore;

/// Maximum number of collection names included in a report.
pub const MAX_REPORTED_COLLECTIONS: usize = 10;

/// Maximum length of an error message embedded in a status string.
pub const MAX_ERROR_CHARS: usize = 80;

/// Connection state observed while probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No store handle exists.
    NotInitialized,
    /// A handle exists but the backend did not answer a ping.
    Unreachable,
    /// Ping succeeded but collections could not be listed.
    Connected,
    /// Ping and listing both succeeded.
    ConnectedAndListing,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Unreachable => "unreachable",
            Self::Connected => "connected",
            Self::ConnectedAndListing => "connected_and_listing",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Diagnostics returned by the `/test` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    /// Always `"running"`: if this report exists, the backend is up.
    pub backend: String,
    /// Human-readable store status.
    pub database: String,
    /// Whether a store connection string was configured.
    pub database_url_set: bool,
    pub database_name: Option<String>,
    pub connection_status: ConnectionStatus,
    /// Up to [`MAX_REPORTED_COLLECTIONS`] collection names.
    pub collections: Vec<String>,
}

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Passed(T),
    Failed(String),
}

/// Database name, or `"Unknown"` when the store cannot tell.
pub fn probe_identity(store: &dyn DocumentStore) -> String {
    store
        .database_name()
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

pub async fn probe_connectivity(store: &dyn DocumentStore) -> Probe<()> {
    match store.ping().await {
        Ok(()) => Probe::Passed(()),
        Err(err) => Probe::Failed(truncate(&err.to_string())),
    }
}

pub async fn probe_listing(store: &dyn DocumentStore) -> Probe<Vec<String>> {
    match store.list_collection_names().await {
        Ok(mut names) => {
            names.truncate(MAX_REPORTED_COLLECTIONS);
            Probe::Passed(names)
        }
        Err(err) => Probe::Failed(truncate(&err.to_string())),
    }
}

/// Sample the store and build a report. Never fails.
pub async fn check_health(
    store: Option<&dyn DocumentStore>,
    database_url_set: bool,
) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        backend: "running".to_string(),
        database: "not available".to_string(),
        database_url_set,
        database_name: None,
        connection_status: ConnectionStatus::NotInitialized,
        collections: Vec::new(),
    };

    let Some(store) = store else {
        return report;
    };

    report.database_name = Some(probe_identity(store));

    if let Probe::Failed(message) = probe_connectivity(store).await {
        report.connection_status = ConnectionStatus::Unreachable;
        report.database = format!("error: {message}");
        return report;
    }
    report.connection_status = ConnectionStatus::Connected;

    match probe_listing(store).await {
        Probe::Passed(names) => {
            report.collections = names;
            report.connection_status = ConnectionStatus::ConnectedAndListing;
            report.database = "connected and working".to_string();
        }
        Probe::Failed(message) => {
            report.database = format!("connected but error: {message}");
        }
    }

    report
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}
