//! Prometheus metrics for the statistics gateway
//!
//! Covers:
//! - HTTP request metrics (latency, status codes)
//! - Transaction outcomes (accepted, stale, malformed)
//! - Window size and statistics reads
//! - Process metrics (uptime, memory)

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::gateway::Outcome;

/// Gateway metrics collector
#[derive(Debug)]
pub struct GatewayMetrics {
    start_time: AtomicU64,
}

impl GatewayMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::register_metrics();

        // SAFETY: Unix timestamp fits in u64 for reasonable dates
        #[allow(clippy::cast_sign_loss)]
        let start_time = Utc::now().timestamp() as u64;

        Self {
            start_time: AtomicU64::new(start_time),
        }
    }

    fn register_metrics() {
        describe_counter!(
            "stats_gateway_http_requests_total",
            "Total number of HTTP requests"
        );
        describe_histogram!(
            "stats_gateway_http_request_duration_seconds",
            "HTTP request duration in seconds"
        );
        describe_counter!(
            "stats_gateway_transactions_total",
            "Transactions received, by outcome"
        );
        describe_counter!(
            "stats_gateway_inline_fallbacks_total",
            "Inserts performed inline because the worker pool was unavailable"
        );
        describe_counter!(
            "stats_gateway_statistics_requests_total",
            "Statistics reads served"
        );
        describe_gauge!(
            "stats_gateway_window_samples",
            "Samples held in the window after the last read"
        );
        describe_gauge!("stats_gateway_uptime_seconds", "Gateway uptime in seconds");
        describe_gauge!("stats_gateway_memory_usage_bytes", "Memory usage in bytes");
    }

    /// Record HTTP request
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration: f64) {
        counter!("stats_gateway_http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status_code" => status.to_string()
        )
        .increment(1);

        histogram!("stats_gateway_http_request_duration_seconds",
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration);
    }

    /// Record the outcome of a transaction submission
    pub fn record_transaction(&self, outcome: Outcome) {
        counter!("stats_gateway_transactions_total",
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    /// Record a transaction rejected before reaching the window
    pub fn record_malformed_transaction(&self) {
        counter!("stats_gateway_transactions_total",
            "outcome" => "malformed"
        )
        .increment(1);
    }

    pub fn record_inline_fallback(&self) {
        counter!("stats_gateway_inline_fallbacks_total").increment(1);
    }

    /// Record a statistics read and the window size it observed
    pub fn record_statistics_request(&self, window_samples: usize) {
        counter!("stats_gateway_statistics_requests_total").increment(1);
        // SAFETY: Sample count safely converts to f64 for metrics
        #[allow(clippy::cast_precision_loss)]
        gauge!("stats_gateway_window_samples").set(window_samples as f64);
    }

    /// Update system metrics
    pub fn update_system_metrics(&self) {
        // SAFETY: Unix timestamp fits in u64
        #[allow(clippy::cast_sign_loss)]
        let now = Utc::now().timestamp() as u64;
        let uptime = now.saturating_sub(self.start_time.load(Ordering::Relaxed));
        // SAFETY: Uptime seconds safely converts to f64 for metrics
        #[allow(clippy::cast_precision_loss)]
        gauge!("stats_gateway_uptime_seconds").set(uptime as f64);

        #[cfg(target_os = "linux")]
        if let Ok(stat) = procfs::process::Process::myself().and_then(|p| p.stat()) {
            let rss_bytes = stat.rss * 4 * 1024; // RSS is in pages, typically 4KB per page
            // SAFETY: Memory size in bytes safely converts to f64 for metrics
            #[allow(clippy::cast_precision_loss)]
            gauge!("stats_gateway_memory_usage_bytes").set(rss_bytes as f64);
        }
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance
static METRICS: OnceLock<GatewayMetrics> = OnceLock::new();

/// Installed Prometheus recorder, if any
static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Get global metrics instance
pub fn get_metrics() -> &'static GatewayMetrics {
    METRICS.get_or_init(GatewayMetrics::new)
}

/// Install the Prometheus recorder and register metric descriptions
///
/// The recorder is process-wide; repeated calls return the first handle.
/// Returns `None` when another recorder was already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = PROMETHEUS.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            GatewayMetrics::register_metrics();
            Some(handle)
        }
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    });
    get_metrics();
    handle.clone()
}

/// Start metrics updater task
pub fn start_metrics_updater() {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));

        loop {
            interval.tick().await;
            get_metrics().update_system_metrics();
        }
    });
}
