//! Transaction recording handlers

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::debug;

use crate::{error::GatewayError, gateway::TransactionGateway, models::TransactionParams};

/// Transaction handlers
#[derive(Debug, Clone)]
pub struct TransactionHandlers {
    gateway: TransactionGateway,
}

impl TransactionHandlers {
    pub const fn new(gateway: TransactionGateway) -> Self {
        Self { gateway }
    }

    /// `POST /transactions?amount=<f64>&timestamp=<epoch millis>`
    ///
    /// `201` when accepted, `204` when older than the retention period,
    /// `400` when either parameter is missing or malformed. No body on
    /// success.
    pub async fn record(
        State(handlers): State<Self>,
        query: Result<Query<TransactionParams>, QueryRejection>,
    ) -> Result<StatusCode, GatewayError> {
        let Query(params) = query.map_err(|rejection| {
            crate::metrics::get_metrics().record_malformed_transaction();
            GatewayError::MalformedInput(rejection.body_text())
        })?;

        debug!(
            amount = params.amount,
            timestamp = params.timestamp,
            "Record transaction request"
        );

        let outcome = handlers
            .gateway
            .record_transaction(params.amount, params.timestamp)
            .await?;
        Ok(outcome.status_code())
    }
}
