//! Test helpers and utilities

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use std::{sync::Arc, time::Instant};
use tower::ServiceExt;
use txn_window::{ManualClock, WindowedAggregator};

use stats_gateway::{
    GatewayConfig, InsertDispatcher, TransactionGateway, WriteMode, WriterConfig,
    server::{AppState, create_router},
};

/// Fixed "now" for every handler test, epoch millis
pub const NOW_MS: i64 = 1_478_192_204_000;

/// Test configuration factory
pub fn create_test_config(mode: WriteMode) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.server.port = 0;
    config.server.compression = false; // Disable for deterministic testing
    config.writer = WriterConfig {
        mode,
        workers: 2,
        queue_capacity: 64,
    };
    config
}

/// Router plus handles onto its clock and window
pub struct TestApp {
    pub clock: Arc<ManualClock>,
    pub gateway: TransactionGateway,
    pub router: Router,
}

impl TestApp {
    /// App whose inserts are visible as soon as the request returns
    pub fn inline() -> Self {
        Self::build(WriteMode::Inline)
    }

    /// App using the asynchronous worker pool; needs a tokio runtime
    pub fn with_workers() -> Self {
        Self::build(WriteMode::Async)
    }

    fn build(mode: WriteMode) -> Self {
        crate::init_test_env();

        let config = create_test_config(mode);
        let clock = Arc::new(ManualClock::at_millis(NOW_MS));
        let aggregator = Arc::new(WindowedAggregator::new(clock.clone()));
        let dispatcher = Arc::new(InsertDispatcher::new(
            Arc::clone(&aggregator),
            &config.writer,
        ));
        let gateway = TransactionGateway::new(aggregator, dispatcher);
        let state = AppState::new(&gateway, None, Instant::now());
        let router = create_router(state, &config);

        Self {
            clock,
            gateway,
            router,
        }
    }

    /// Send a request through the router
    pub async fn send(&self, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// `POST /transactions` with the given amount and absolute timestamp
    pub async fn post_transaction(&self, amount: f64, timestamp_ms: i64) -> StatusCode {
        let uri = format!("/transactions?amount={amount}&timestamp={timestamp_ms}");
        self.send(Method::POST, &uri).await.status()
    }

    /// `GET /statistics` decoded as JSON
    pub async fn get_statistics(&self) -> Value {
        let response = self.send(Method::GET, "/statistics").await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }
}

/// Collect a response body as raw bytes
pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Collect a response body as JSON
pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
