//! Transaction handler unit tests

use axum::http::{Method, StatusCode};
use rstest::*;

use super::helpers::*;

#[rstest]
#[case::now(0, StatusCode::CREATED)]
#[case::thirty_seconds_ago(30_000, StatusCode::CREATED)]
#[case::exactly_sixty_seconds_ago(60_000, StatusCode::CREATED)]
#[case::sixty_seconds_and_a_milli(60_001, StatusCode::NO_CONTENT)]
#[case::sixty_one_seconds_ago(61_000, StatusCode::NO_CONTENT)]
#[case::an_hour_ago(3_600_000, StatusCode::NO_CONTENT)]
#[case::in_the_future(-5_000, StatusCode::CREATED)]
#[tokio::test]
async fn test_record_transaction_status(#[case] age_ms: i64, #[case] expected: StatusCode) {
    let app = TestApp::inline();
    let status = app.post_transaction(12.3, NOW_MS - age_ms).await;
    assert_eq!(status, expected);
}

#[tokio::test]
async fn test_accepted_transaction_has_no_body() {
    let app = TestApp::inline();
    let response = app
        .send(
            Method::POST,
            &format!("/transactions?amount=12.3&timestamp={NOW_MS}"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_stale_transaction_leaves_window_unchanged() {
    let app = TestApp::inline();
    app.post_transaction(7.0, NOW_MS - 1_000).await;

    let status = app.post_transaction(100.0, NOW_MS - 61_000).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.gateway.window_len(), 1);

    let stats = app.get_statistics().await;
    assert_eq!(stats["count"], 1);
    assert_eq!(stats["sum"], 7.0);
}

#[rstest]
#[case::missing_amount("/transactions?timestamp=1478192204000")]
#[case::missing_timestamp("/transactions?amount=12.3")]
#[case::no_params("/transactions")]
#[case::amount_not_a_number("/transactions?amount=abc&timestamp=1478192204000")]
#[case::timestamp_not_an_integer("/transactions?amount=1&timestamp=12.5")]
#[case::timestamp_text("/transactions?amount=1&timestamp=yesterday")]
#[case::nan_amount("/transactions?amount=NaN&timestamp=1478192204000")]
#[case::infinite_amount("/transactions?amount=inf&timestamp=1478192204000")]
#[case::timestamp_out_of_range("/transactions?amount=1&timestamp=9223372036854775807")]
#[tokio::test]
async fn test_malformed_transaction_rejected(#[case] uri: &str) {
    let app = TestApp::inline();
    let response = app.send(Method::POST, uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "malformed_input");
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert_eq!(app.gateway.window_len(), 0);
}

#[tokio::test]
async fn test_get_on_transactions_not_allowed() {
    let app = TestApp::inline();
    let response = app.send(Method::GET, "/transactions").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
