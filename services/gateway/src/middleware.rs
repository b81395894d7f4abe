//! Request logging middleware

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::metrics::get_metrics;

/// Response header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware
///
/// Tags every request with a fresh id, logs its outcome and feeds the
/// HTTP request metrics.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    // Route template when matched, raw path otherwise
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| uri.path().to_string(), |p| p.as_str().to_string());
    let request_id = Uuid::new_v4();

    let span = info_span!("request", %request_id);
    let mut response = next.run(request).instrument(span.clone()).await;

    let duration = start.elapsed();
    let status = response.status();

    span.in_scope(|| {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis(),
            "Request processed"
        );
    });
    get_metrics().record_http_request(
        method.as_str(),
        &path,
        status.as_u16(),
        duration.as_secs_f64(),
    );

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
