//! Prometheus output for the HTTP surface. Runs in its own process because
//! the recorder is global.

use axum_test::TestServer;
use serde_json::json;

use traffic_tracker_service::{METRICS_PATH, build_router};
use traffic_tracker_service_shared::test_utils::memory_state;
use traffic_tracker_service_shared::{CorsOrigins, MetricsConfig, UNMATCHED_ROUTE, init_metrics};

#[tokio::test]
async fn metric_labels_do_not_follow_client_input() {
    init_metrics(&MetricsConfig::default()).expect("recorder installs once per process");

    let (_, state) = memory_state();
    let server = TestServer::new(build_router(state, &CorsOrigins::Any, METRICS_PATH))
        .expect("failed to build test server");

    for n in 0..20 {
        server
            .post("/api/track")
            .json(&json!({ "path": format!("/page/{n}"), "event": format!("evt-{n}") }))
            .await
            .assert_status_ok();
        server.get(&format!("/nope/{n}")).await;
    }

    let body = server.get(METRICS_PATH).await.text();

    assert!(body.contains("traffic_events_tracked_total 20"), "{body}");
    assert!(body.contains(r#"path="/api/track""#), "{body}");
    assert!(body.contains(&format!(r#"path="{UNMATCHED_ROUTE}""#)), "{body}");
    assert!(!body.contains("evt-"), "{body}");
    assert!(!body.contains("/nope/"), "{body}");
    assert!(!body.contains("/page/"), "{body}");
}
