//! REST API models and request/response types

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use txn_window::Summary;

/// Query parameters of `POST /transactions`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransactionParams {
    /// Transaction amount
    pub amount: f64,
    /// Transaction time in unix epoch milliseconds, UTC
    pub timestamp: i64,
}

/// Body of `GET /statistics`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub sum: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub count: u64,
}

impl From<Summary> for StatisticsResponse {
    fn from(summary: Summary) -> Self {
        Self {
            sum: summary.sum,
            avg: summary.avg,
            max: summary.max,
            min: summary.min,
            count: summary.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server started
    pub uptime_seconds: u64,
    /// Samples currently held in the window
    pub window_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable message
    pub message: String,
    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FxHashMap<String, String>>,
}
