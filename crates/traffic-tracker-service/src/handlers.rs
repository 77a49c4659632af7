//! Request handlers.
//!
//! Handlers only translate between HTTP and [`TrafficTracker`]; every rule
//! about what gets stored lives in `traffic-tracker-lib`.
//!
//! [`TrafficTracker`]: traffic_tracker_lib::TrafficTracker

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use traffic_tracker_lib::{DEFAULT_EVENT, DiagnosticsReport, EventQuery, TrafficEvent};
use traffic_tracker_service_shared::{
    AppState, ClientInfo, ProblemDetails, RequestId, StatsQuery, TrackRequest,
    from_ingestion_error, from_query_error, record_event_tracked, record_events_returned,
    record_track_failed,
};

/// Body of `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootMessage {
    pub message: String,
}

/// Body returned after an event is recorded.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    /// Identifier assigned by the store.
    pub id: String,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub items: Vec<TrafficEvent>,
}

/// Handle `GET /`.
pub async fn root() -> Json<RootMessage> {
    Json(RootMessage {
        message: "Traffic Tracker API is running".to_string(),
    })
}

/// Handle `GET /test`.
///
/// Always answers 200; store problems are described in the report.
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    let report = state.tracker().check_health().await;
    info!(
        connection_status = %report.connection_status,
        collections = report.collections.len(),
        "diagnostics requested"
    );
    Json(report)
}

/// Handle `POST /api/track`.
pub async fn track_event(
    State(state): State<AppState>,
    request_id: RequestId,
    ClientInfo(metadata): ClientInfo,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>, ProblemDetails> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(request_id = %request_id, error = %rejection, "rejected track body");
        record_track_failed("invalid_body");
        ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
    })?;

    let event = request
        .event
        .clone()
        .unwrap_or_else(|| DEFAULT_EVENT.to_string());

    info!(
        request_id = %request_id,
        path = %request.path,
        event = %event,
        "tracking event"
    );

    match state.tracker().track(request.into(), &metadata).await {
        Ok(id) => {
            record_event_tracked();
            info!(request_id = %request_id, id = %id, "event recorded");
            Ok(Json(TrackResponse {
                id: id.into_string(),
            }))
        }
        Err(e) => {
            let reason = if e.is_validation() {
                "validation_error"
            } else {
                "store_error"
            };
            record_track_failed(reason);
            if e.is_validation() {
                warn!(request_id = %request_id, error = %e, "rejected track body");
            } else {
                error!(request_id = %request_id, error = %e, "failed to record event");
            }
            Err(from_ingestion_error(&e, request_id.as_str()))
        }
    }
}

/// Handle `GET /api/stats`.
pub async fn stats(
    State(state): State<AppState>,
    request_id: RequestId,
    params: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, ProblemDetails> {
    let Query(params) = params.map_err(|rejection| {
        warn!(request_id = %request_id, error = %rejection, "rejected stats query");
        ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
    })?;

    let query = EventQuery::from(params);
    let items = state.tracker().list_events(&query).await.map_err(|e| {
        if e.is_validation() {
            warn!(request_id = %request_id, error = %e, "rejected stats query");
        } else {
            error!(request_id = %request_id, error = %e, "failed to list events");
        }
        from_query_error(&e, request_id.as_str())
    })?;

    record_events_returned(items.len());
    info!(request_id = %request_id, count = items.len(), "events listed");

    Ok(Json(StatsResponse { items }))
}
