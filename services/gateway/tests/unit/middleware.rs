//! Middleware unit tests

use axum::http::{Method, StatusCode};
use uuid::Uuid;

use stats_gateway::middleware::REQUEST_ID_HEADER;

use super::helpers::*;

#[tokio::test]
async fn test_every_response_carries_a_request_id() {
    let app = TestApp::inline();

    let first = app.send(Method::GET, "/statistics").await;
    let second = app.send(Method::GET, "/statistics").await;

    let first_id = first.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    let second_id = second.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(first_id).is_ok());
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn test_request_id_on_error_responses() {
    let app = TestApp::inline();
    let response = app.send(Method::POST, "/transactions?amount=x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::inline();
    let response = app.send(Method::GET, "/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}
