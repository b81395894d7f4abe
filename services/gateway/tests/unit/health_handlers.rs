//! Health and metrics handler unit tests

use axum::http::{Method, StatusCode};
use std::time::Instant;

use stats_gateway::{
    metrics::init_metrics,
    server::{AppState, create_router},
};

use super::helpers::*;
use crate::assertions::assert_json_has_fields;

#[tokio::test]
async fn test_health_reports_window_size() {
    let app = TestApp::inline();
    app.post_transaction(3.0, NOW_MS).await;
    app.post_transaction(4.0, NOW_MS).await;

    let response = app.send(Method::GET, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_json_has_fields(&body, &["status", "version", "uptime_seconds", "window_size"]);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["window_size"], 2);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let app = TestApp::inline();
    let response = app.send(Method::GET, "/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_renders_transaction_counters() {
    let handle = init_metrics().expect("recorder should install in the test process");
    let app = TestApp::inline();
    let router = create_router(
        AppState::new(&app.gateway, Some(handle), Instant::now()),
        &create_test_config(stats_gateway::WriteMode::Inline),
    );
    let app = TestApp { router, ..app };

    app.post_transaction(1.0, NOW_MS).await;
    app.post_transaction(1.0, NOW_MS - 120_000).await;

    let response = app.send(Method::GET, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("stats_gateway_transactions_total"));
    assert!(text.contains("outcome=\"accepted\""));
    assert!(text.contains("outcome=\"rejected_stale\""));
}
