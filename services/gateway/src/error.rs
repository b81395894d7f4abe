//! Gateway error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Errors surfaced at the HTTP boundary
///
/// A stale transaction is not an error; it is an [`Outcome`](crate::gateway::Outcome).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or undecodable amount / timestamp
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::MalformedInput(reason) => warn!("Rejected request: {}", reason),
            Self::Internal(reason) => error!("Request failed: {}", reason),
        }

        let mut details = FxHashMap::default();
        details.insert("status".to_string(), status.as_u16().to_string());

        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            details: Some(details),
        };
        (status, Json(body)).into_response()
    }
}
