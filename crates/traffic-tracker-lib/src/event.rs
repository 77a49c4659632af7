//! Traffic event schema.
//!
//! [`NewTrafficEvent`] is what ingestion persists; [`TrafficEvent`] is the
//! normalized record handed back to readers, with the identifier and
//! store-managed timestamps rendered as strings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;
use crate::store::{Document, StoredDocument};

/// Collection that holds every traffic event.
pub const EVENT_COLLECTION: &str = "trafficevent";

/// Event name used when the caller does not supply one.
pub const DEFAULT_EVENT: &str = "view";

/// A traffic event ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrafficEvent {
    pub path: String,
    pub event: String,
    pub source: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl NewTrafficEvent {
    /// Convert into a store document. Absent optionals are kept as `null`.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

/// A persisted traffic event, normalized for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficEvent {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    pub path: String,
    pub event: String,
    pub source: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Caller-visible fields as stored; unknown keys are ignored.
#[derive(Deserialize)]
struct StoredFields {
    path: String,
    #[serde(default = "default_event")]
    event: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    ip: Option<String>,
}

fn default_event() -> String {
    DEFAULT_EVENT.to_string()
}

impl TrafficEvent {
    /// Decode a stored document into its transport form.
    pub fn from_stored(stored: StoredDocument) -> Result<Self, QueryError> {
        let id = stored.id.into_string();
        let fields: StoredFields = serde_json::from_value(Value::Object(stored.fields))
            .map_err(|err| QueryError::Decode {
                id: id.clone(),
                message: err.to_string(),
            })?;

        Ok(Self {
            id,
            path: fields.path,
            event: fields.event,
            source: fields.source,
            user_agent: fields.user_agent,
            ip: fields.ip,
            created_at: stored.created_at.map(format_timestamp),
            updated_at: stored.updated_at.map(format_timestamp),
        })
    }
}

/// Canonical textual form for timestamps on the wire.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentId;
    use chrono::TimeZone;
    use serde_json::json;

    fn stored(fields: Value) -> StoredDocument {
        let Value::Object(fields) = fields else {
            panic!("expected object");
        };
        StoredDocument {
            id: DocumentId::new("0001"),
            created_at: Some(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()),
            updated_at: None,
            fields,
        }
    }

    #[test]
    fn new_event_keeps_null_optionals() {
        let event = NewTrafficEvent {
            path: "/home".into(),
            event: "view".into(),
            source: None,
            user_agent: Some("TestAgent/1.0".into()),
            ip: None,
        };
        let doc = event.to_document().unwrap();
        assert_eq!(doc.get("source"), Some(&Value::Null));
        assert_eq!(doc.get("ip"), Some(&Value::Null));
        assert_eq!(doc.get("user_agent"), Some(&json!("TestAgent/1.0")));
    }

    #[test]
    fn stored_document_is_normalized() {
        let event = TrafficEvent::from_stored(stored(json!({
            "path": "/home",
            "event": "click",
            "source": "newsletter",
            "user_agent": null,
            "ip": "10.0.0.1",
            "extra": 42
        })))
        .unwrap();

        assert_eq!(event.id, "0001");
        assert_eq!(event.event, "click");
        assert_eq!(event.source.as_deref(), Some("newsletter"));
        assert_eq!(event.user_agent, None);
        assert_eq!(
            event.created_at.as_deref(),
            Some("2026-10-19T12:00:00.000000Z")
        );
        assert_eq!(event.updated_at, None);
    }

    #[test]
    fn missing_event_defaults_to_view() {
        let event = TrafficEvent::from_stored(stored(json!({"path": "/"}))).unwrap();
        assert_eq!(event.event, DEFAULT_EVENT);
        assert_eq!(event.source, None);
    }

    #[test]
    fn record_without_path_fails_to_decode() {
        let err = TrafficEvent::from_stored(stored(json!({"event": "view"}))).unwrap_err();
        assert!(matches!(err, QueryError::Decode { ref id, .. } if id == "0001"));
    }

    #[test]
    fn transport_form_uses_underscore_id_and_null_source() {
        let event = TrafficEvent::from_stored(stored(json!({"path": "/a", "source": null})))
            .unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["_id"], json!("0001"));
        assert_eq!(json["source"], Value::Null);
        assert!(json.get("id").is_none());
    }
}
