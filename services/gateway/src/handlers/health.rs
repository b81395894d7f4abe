//! Health check and monitoring handlers

use axum::{extract::State, http::StatusCode, response::Json};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;
use tracing::{debug, warn};

use crate::{gateway::TransactionGateway, models::HealthCheckResponse};

/// Health check handlers
#[derive(Clone)]
pub struct HealthHandlers {
    gateway: TransactionGateway,
    prometheus: Option<PrometheusHandle>,
    start_time: Instant,
}

impl HealthHandlers {
    pub const fn new(
        gateway: TransactionGateway,
        prometheus: Option<PrometheusHandle>,
        start_time: Instant,
    ) -> Self {
        Self {
            gateway,
            prometheus,
            start_time,
        }
    }

    /// Health check endpoint
    pub async fn health_check(State(handlers): State<Self>) -> Json<HealthCheckResponse> {
        debug!("Health check request");

        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: handlers.start_time.elapsed().as_secs(),
            window_size: handlers.gateway.window_len(),
        })
    }

    /// Prometheus metrics endpoint
    pub async fn metrics(State(handlers): State<Self>) -> Result<String, StatusCode> {
        let Some(prometheus) = handlers.prometheus else {
            warn!("Metrics requested but no Prometheus recorder is installed");
            return Err(StatusCode::NOT_FOUND);
        };

        crate::metrics::get_metrics().update_system_metrics();
        Ok(prometheus.render())
    }
}
