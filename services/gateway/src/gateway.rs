//! Transaction gateway
//!
//! Translates inbound transactions and statistics reads into calls on the
//! shared window. Staleness is decided here, before the window is touched.

use axum::http::StatusCode;
use std::sync::Arc;
use tracing::debug;
use txn_window::{Sample, Summary, WindowedAggregator, is_stale};

use crate::dispatcher::InsertDispatcher;
use crate::error::GatewayError;
use crate::metrics::get_metrics;

/// Result of recording a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handed to the window for processing
    Accepted,
    /// Older than the retention period; the window was not touched
    RejectedStale,
}

impl Outcome {
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Accepted => StatusCode::CREATED,
            Self::RejectedStale => StatusCode::NO_CONTENT,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::RejectedStale => "rejected_stale",
        }
    }
}

/// Front door to the transaction window
#[derive(Debug, Clone)]
pub struct TransactionGateway {
    aggregator: Arc<WindowedAggregator>,
    dispatcher: Arc<InsertDispatcher>,
}

impl TransactionGateway {
    #[must_use]
    pub const fn new(
        aggregator: Arc<WindowedAggregator>,
        dispatcher: Arc<InsertDispatcher>,
    ) -> Self {
        Self {
            aggregator,
            dispatcher,
        }
    }

    /// Record a transaction given its amount and epoch-millisecond timestamp
    ///
    /// `Accepted` means the sample was handed off; with the async writer it
    /// may not be visible to an immediately following statistics read.
    pub async fn record_transaction(
        &self,
        amount: f64,
        timestamp_ms: i64,
    ) -> Result<Outcome, GatewayError> {
        if !amount.is_finite() {
            get_metrics().record_malformed_transaction();
            return Err(GatewayError::MalformedInput(format!(
                "amount must be a finite number, got {amount}"
            )));
        }
        let Some(sample) = Sample::from_millis(timestamp_ms, amount) else {
            get_metrics().record_malformed_transaction();
            return Err(GatewayError::MalformedInput(format!(
                "timestamp {timestamp_ms} is out of range"
            )));
        };

        let now = self.aggregator.clock().now();
        let outcome = if is_stale(sample.timestamp, now, self.aggregator.retention()) {
            debug!(timestamp_ms, amount, "Stale transaction rejected");
            Outcome::RejectedStale
        } else {
            self.dispatcher.dispatch(sample).await;
            Outcome::Accepted
        };

        get_metrics().record_transaction(outcome);
        Ok(outcome)
    }

    /// Statistics over the current window
    pub fn fetch_statistics(&self) -> Summary {
        let now = self.aggregator.clock().now();
        let summary = self.aggregator.summary(now, self.aggregator.retention());
        get_metrics().record_statistics_request(self.aggregator.len());
        summary
    }

    /// Samples currently held, including any not yet trimmed
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.aggregator.len()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<InsertDispatcher> {
        &self.dispatcher
    }
}
