//! A single recorded transaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable (timestamp, amount) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the transaction happened, UTC
    pub timestamp: DateTime<Utc>,
    /// Transaction amount
    pub amount: f64,
}

impl Sample {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, amount: f64) -> Self {
        Self { timestamp, amount }
    }

    /// Build a sample from unix epoch milliseconds
    ///
    /// Returns `None` when the milliseconds fall outside the representable
    /// date range.
    #[must_use]
    pub fn from_millis(timestamp_ms: i64, amount: f64) -> Option<Self> {
        DateTime::from_timestamp_millis(timestamp_ms).map(|timestamp| Self { timestamp, amount })
    }

    /// Timestamp as unix epoch milliseconds
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
