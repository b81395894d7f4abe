//! Transaction statistics gateway
//!
//! HTTP front end over a trailing 60 second transaction window.
//! Features:
//! - `POST /transactions` with staleness rejection
//! - `GET /statistics` returning sum, avg, max, min and count
//! - Asynchronous insert worker pool with bounded queues
//! - Prometheus metrics and health endpoints

#![allow(missing_docs)]

use anyhow::Result;

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod server;

pub use config::{GatewayConfig, MonitoringConfig, ServerConfig, WriterConfig};
pub use dispatcher::{InsertDispatcher, WriteMode};
pub use error::GatewayError;
pub use gateway::{Outcome, TransactionGateway};
pub use server::StatsGatewayServer;

/// Start the statistics gateway server
pub async fn start_server(config: GatewayConfig) -> Result<()> {
    let server = StatsGatewayServer::new(config).await?;
    server.start().await
}
