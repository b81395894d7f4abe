//! Statistics handler unit tests

use axum::http::StatusCode;
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration as StdDuration;

use super::helpers::*;
use crate::assertions::assert_statistics;

#[tokio::test]
async fn test_empty_window_statistics() {
    let app = TestApp::inline();
    let stats = app.get_statistics().await;
    assert_eq!(
        stats,
        json!({"sum": 0.0, "avg": 0.0, "max": 0.0, "min": 0.0, "count": 0})
    );
}

#[tokio::test]
async fn test_statistics_over_recorded_transactions() {
    let app = TestApp::inline();
    for (amount, age_ms) in [(100.0, 1_000), (200.0, 10_000), (50.0, 59_000), (650.0, 0)] {
        assert_eq!(
            app.post_transaction(amount, NOW_MS - age_ms).await,
            StatusCode::CREATED
        );
    }

    let stats = app.get_statistics().await;
    assert_statistics(&stats, 1000.0, 250.0, 650.0, 50.0, 4);
}

#[tokio::test]
async fn test_same_timestamp_transactions_both_counted() {
    let app = TestApp::inline();
    app.post_transaction(10.0, NOW_MS).await;
    app.post_transaction(20.0, NOW_MS).await;

    let stats = app.get_statistics().await;
    assert_statistics(&stats, 30.0, 15.0, 20.0, 10.0, 2);
}

#[tokio::test]
async fn test_statistics_drop_transactions_as_they_age() {
    let app = TestApp::inline();
    app.post_transaction(5.0, NOW_MS - 50_000).await;
    app.post_transaction(15.0, NOW_MS).await;
    assert_eq!(app.get_statistics().await["count"], 2);

    app.clock.advance(Duration::seconds(15));
    let stats = app.get_statistics().await;
    assert_statistics(&stats, 15.0, 15.0, 15.0, 15.0, 1);

    app.clock.advance(Duration::seconds(46));
    let stats = app.get_statistics().await;
    assert_statistics(&stats, 0.0, 0.0, 0.0, 0.0, 0);
}

#[tokio::test]
async fn test_async_writes_become_visible() {
    let app = TestApp::with_workers();
    for i in 0..20 {
        assert_eq!(
            app.post_transaction(1.5, NOW_MS - i * 100).await,
            StatusCode::CREATED
        );
    }

    // Accepted writes are not guaranteed visible yet; poll until they are
    let stats = tokio::time::timeout(StdDuration::from_secs(5), async {
        loop {
            let stats = app.get_statistics().await;
            if stats["count"] == 20 {
                return stats;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await
    .expect("async inserts never became visible");

    assert_statistics(&stats, 30.0, 1.5, 1.5, 1.5, 20);
    app.gateway.dispatcher().shutdown().await;
}
