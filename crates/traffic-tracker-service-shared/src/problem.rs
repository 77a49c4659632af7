//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use traffic_tracker_lib::{IngestionError, QueryError, StoreError};

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// Provides a consistent format for error responses across all endpoints.
/// `detail` always carries the underlying failure message.
///
/// # Example
///
/// ```
/// use traffic_tracker_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("the 'path' field is required and cannot be empty")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// HTTP status as a typed code.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Set the content-type header to application/problem+json
        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Store failures are server-side problems. Every variant maps to 500 so
/// clients see one failure status for storage regardless of cause.
fn from_store_error(error: &StoreError, request_id: &str) -> ProblemDetails {
    ProblemDetails::internal_error(error.to_string(), request_id)
}

/// Convert ingestion errors to ProblemDetails.
///
/// Validation failures become 400; everything else is a 500 carrying the
/// underlying message.
pub fn from_ingestion_error(error: &IngestionError, request_id: &str) -> ProblemDetails {
    match error {
        IngestionError::Store(store) => from_store_error(store, request_id),
        other => ProblemDetails::bad_request(other.to_string(), request_id),
    }
}

/// Convert query errors to ProblemDetails.
pub fn from_query_error(error: &QueryError, request_id: &str) -> ProblemDetails {
    match error {
        QueryError::InvalidLimit { .. } => ProblemDetails::bad_request(error.to_string(), request_id),
        QueryError::Store(store) => from_store_error(store, request_id),
        QueryError::Decode { .. } => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
        assert_eq!(problem.title, "Invalid Request");
        assert_eq!(problem.status, 400);
        assert!(problem.detail.is_none());
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::internal_error("boom", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/internal-error\""));
        assert!(json.contains("\"title\":\"Internal Error\""));
        assert!(json.contains("\"status\":500"));
        assert!(json.contains("\"detail\":\"boom\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_problem_into_response_sets_status_and_content_type() {
        let response = ProblemDetails::bad_request("bad", "req-1").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[test]
    fn test_from_ingestion_error_missing_path_is_400() {
        let problem = from_ingestion_error(&IngestionError::MissingPath, "req-a");
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("'path'"));
    }

    #[test]
    fn test_from_ingestion_error_store_is_500_with_message() {
        let error = IngestionError::Store(StoreError::Unavailable {
            message: "connection reset".to_string(),
        });
        let problem = from_ingestion_error(&error, "req-b");
        assert_eq!(problem.status, 500);
        assert!(problem.detail.as_deref().unwrap().contains("connection reset"));
    }

    #[test]
    fn test_from_ingestion_error_not_initialized_is_500() {
        let error = IngestionError::Store(StoreError::NotInitialized);
        let problem = from_ingestion_error(&error, "req-c");
        assert_eq!(problem.status, 500);
        assert_eq!(problem.detail.as_deref(), Some("database not available"));
    }

    #[test]
    fn test_from_query_error_invalid_limit_is_400() {
        let error = QueryError::InvalidLimit {
            limit: 0,
            max: 500,
        };
        let problem = from_query_error(&error, "req-d");
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("'limit'"));
    }

    #[test]
    fn test_from_query_error_store_is_500() {
        let error = QueryError::Store(StoreError::NotInitialized);
        assert_eq!(from_query_error(&error, "req-e").status, 500);
    }
}
