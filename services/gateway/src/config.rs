//! Configuration for the statistics gateway

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dispatcher::WriteMode;

/// Statistics gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Transaction write path configuration
    pub writer: WriterConfig,
    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Enable compression
    pub compression: bool,
}

/// How accepted transactions reach the window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// `async` hands inserts to the worker pool, `inline` inserts on the request path
    pub mode: WriteMode,
    /// Number of insert workers
    pub workers: usize,
    /// Pending inserts buffered per worker before callers wait
    pub queue_capacity: usize,
}

/// Monitoring and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Enable Prometheus metrics
    pub metrics_enabled: bool,
    /// Metrics endpoint path
    pub metrics_path: String,
    /// Health check endpoint path
    pub health_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_seconds: 30,
            compression: true,
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            mode: WriteMode::Async,
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_path: "/metrics".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("GATEWAY").separator("__")
}

impl GatewayConfig {
    /// Load configuration from file, with `GATEWAY__SECTION__KEY` environment overrides
    ///
    /// `GATEWAY__SERVER__PORT=9000` sets `server.port`. The prefix is joined
    /// with a double underscore as well; `GATEWAY_SERVER__PORT` is not read.
    pub fn from_file(path: &str) -> Result<Self> {
        Self::load(path, environment())
    }

    fn load(path: &str, env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Get server address
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
