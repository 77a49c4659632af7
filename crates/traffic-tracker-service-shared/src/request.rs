//! Request bodies, query strings and client details for HTTP endpoints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use traffic_tracker_lib::{EventQuery, RequestMetadata, TrackInput, DEFAULT_LIMIT};

/// Body of `POST /api/track`.
///
/// Only a JSON object is accepted. Field rules (non-empty path and event)
/// are enforced by the tracker, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct TrackRequest {
    /// Page path being recorded.
    pub path: String,

    /// Event name; `"view"` when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Free-form origin of the visit (campaign, referrer, ...).
    pub source: Option<String>,
}

#[derive(Deserialize)]
struct TrackFields {
    path: String,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl TryFrom<Map<String, Value>> for TrackRequest {
    type Error = serde_json::Error;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: TrackFields = serde_json::from_value(Value::Object(body))?;
        Ok(Self {
            path: fields.path,
            event: fields.event,
            source: fields.source,
        })
    }
}

impl From<TrackRequest> for TrackInput {
    fn from(request: TrackRequest) -> Self {
        TrackInput {
            path: request.path,
            event: request.event,
            source: request.source,
        }
    }
}

/// Query string of `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsQuery {
    /// Only events for this path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Only events with this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Maximum number of results to return. Bounds are checked by the tracker.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self {
            path: None,
            event: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl From<StatsQuery> for EventQuery {
    fn from(query: StatsQuery) -> Self {
        EventQuery {
            path: query.path,
            event: query.event,
            limit: query.limit,
        }
    }
}

/// Header naming the original client when behind a proxy.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Client details derived from the request: user agent, forwarded address
/// and the transport peer address (when the server records it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo(pub RequestMetadata);

impl ClientInfo {
    /// Header values that are not valid UTF-8 are kept, with invalid bytes
    /// replaced, rather than dropped.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header_text = |name: &str| {
            headers
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        };

        Self(RequestMetadata {
            user_agent: header_text(header::USER_AGENT.as_str()),
            forwarded_for: header_text(FORWARDED_FOR_HEADER),
            peer_addr: peer.map(|addr| addr.ip()),
        })
    }

}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    #[test]
    fn test_track_request_deserialization_defaults() {
        let req: TrackRequest = serde_json::from_str(r#"{"path":"/home"}"#).unwrap();
        assert!(req.event.is_none());
        assert!(req.source.is_none());

        let input = TrackInput::from(req);
        assert_eq!(input.path, "/home");
        assert!(input.event.is_none());
    }

    #[test]
    fn test_track_request_keeps_blank_values_for_the_tracker() {
        let req: TrackRequest =
            serde_json::from_str(r#"{"path":"  ","event":"","source":null}"#).unwrap();
        assert_eq!(req.path, "  ");
        assert_eq!(req.event.as_deref(), Some(""));
        assert!(req.source.is_none());
    }

    #[test]
    fn test_track_request_missing_path_fails_to_parse() {
        let result: Result<TrackRequest, _> = serde_json::from_str(r#"{"event":"view"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_track_request_rejects_non_objects() {
        for body in [r#"["/x","click","ad"]"#, r#""/x""#, "42", "null"] {
            let result: Result<TrackRequest, _> = serde_json::from_str(body);
            assert!(result.is_err(), "accepted {body}");
        }
    }

    #[test]
    fn test_stats_query_defaults() {
        let query: StatsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);

        let query = EventQuery::from(query);
        assert!(query.path.is_none());
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_stats_query_limit_is_checked_by_the_tracker() {
        let query = StatsQuery {
            limit: 0,
            ..StatsQuery::default()
        };
        let err = EventQuery::from(query).validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_client_info_uses_headers_and_peer() {
        let (mut parts, _) = Request::builder()
            .header("user-agent", "TestAgent/1.0")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 50123))));

        let ClientInfo(meta) = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(meta.user_agent.as_deref(), Some("TestAgent/1.0"));
        assert_eq!(meta.forwarded_for, None);
        assert_eq!(meta.client_ip().as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_client_info_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));

        let ClientInfo(meta) =
            ClientInfo::from_parts(&headers, Some(SocketAddr::from(([10, 0, 0, 1], 80))));
        assert_eq!(meta.user_agent, None);
        assert_eq!(meta.client_ip().as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_info_keeps_non_utf8_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_bytes(b"203.0.113.9\xff").unwrap(),
        );

        let ClientInfo(meta) =
            ClientInfo::from_parts(&headers, Some(SocketAddr::from(([10, 0, 0, 1], 80))));
        assert_eq!(
            meta.client_ip().as_deref(),
            Some("203.0.113.9\u{FFFD}")
        );
    }
}
