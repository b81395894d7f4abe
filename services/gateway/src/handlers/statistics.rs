//! Statistics handlers

use axum::{extract::State, response::Json};
use tracing::debug;

use crate::{error::GatewayError, gateway::TransactionGateway, models::StatisticsResponse};

/// Statistics handlers
#[derive(Debug, Clone)]
pub struct StatisticsHandlers {
    gateway: TransactionGateway,
}

impl StatisticsHandlers {
    pub const fn new(gateway: TransactionGateway) -> Self {
        Self { gateway }
    }

    /// `GET /statistics`
    ///
    /// The window scan runs on the blocking pool so a large window does not
    /// stall the request executor.
    pub async fn statistics(
        State(handlers): State<Self>,
    ) -> Result<Json<StatisticsResponse>, GatewayError> {
        let gateway = handlers.gateway.clone();
        let summary = tokio::task::spawn_blocking(move || gateway.fetch_statistics())
            .await
            .map_err(|e| GatewayError::Internal(format!("statistics task failed: {e}")))?;

        debug!(count = summary.count, sum = summary.sum, "Statistics computed");
        Ok(Json(StatisticsResponse::from(summary)))
    }
}
