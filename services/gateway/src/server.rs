//! Statistics gateway server implementation

use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{
    future::Future,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use txn_window::{Clock, SystemClock, WindowedAggregator};

use crate::{
    config::GatewayConfig,
    dispatcher::InsertDispatcher,
    error::GatewayError,
    gateway::TransactionGateway,
    handlers::{HealthHandlers, StatisticsHandlers, TransactionHandlers},
    metrics::{init_metrics, start_metrics_updater},
    middleware::logging_middleware,
    models::{HealthCheckResponse, StatisticsResponse, TransactionParams},
};

/// Unified application state containing all handlers
#[derive(Clone)]
pub struct AppState {
    pub transaction_handlers: TransactionHandlers,
    pub statistics_handlers: StatisticsHandlers,
    pub health_handlers: HealthHandlers,
}

impl AppState {
    #[must_use]
    pub fn new(
        gateway: &TransactionGateway,
        prometheus: Option<PrometheusHandle>,
        start_time: Instant,
    ) -> Self {
        Self {
            transaction_handlers: TransactionHandlers::new(gateway.clone()),
            statistics_handlers: StatisticsHandlers::new(gateway.clone()),
            health_handlers: HealthHandlers::new(gateway.clone(), prometheus, start_time),
        }
    }
}

/// Statistics gateway server
pub struct StatsGatewayServer {
    config: GatewayConfig,
    gateway: TransactionGateway,
    prometheus: Option<PrometheusHandle>,
    start_time: Instant,
}

impl StatsGatewayServer {
    /// Create a server backed by the wall clock
    ///
    /// Must be called inside a tokio runtime; the insert workers start here.
    pub async fn new(config: GatewayConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Create a server with an explicit time source
    pub async fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        info!("Initializing statistics gateway server");

        let prometheus = if config.monitoring.metrics_enabled {
            let handle = init_metrics();
            if handle.is_some() {
                start_metrics_updater();
            }
            handle
        } else {
            None
        };

        let aggregator = Arc::new(WindowedAggregator::new(clock));
        let dispatcher = Arc::new(InsertDispatcher::new(
            Arc::clone(&aggregator),
            &config.writer,
        ));
        let gateway = TransactionGateway::new(aggregator, dispatcher);

        info!("Statistics gateway server initialized successfully");

        Ok(Self {
            config,
            gateway,
            prometheus,
            start_time: Instant::now(),
        })
    }

    #[must_use]
    pub const fn gateway(&self) -> &TransactionGateway {
        &self.gateway
    }

    /// Bind the configured address and serve until Ctrl-C / SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = match self.config.server_address().parse() {
            Ok(addr) => addr,
            Err(e) => {
                error!(
                    "Invalid server address '{}': {}",
                    self.config.server_address(),
                    e
                );
                return Err(anyhow::anyhow!("Invalid server address: {}", e));
            }
        };

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("TCP listener bound successfully to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind TCP listener to {}: {}", addr, e);
                return Err(anyhow::anyhow!("Failed to bind to address {}: {}", addr, e));
            }
        };

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Pending inserts are drained before this returns.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.create_app();
        let dispatcher = Arc::clone(self.gateway.dispatcher());

        info!(
            "Starting statistics gateway on {}",
            listener.local_addr()?
        );

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        dispatcher.shutdown().await;

        if let Err(e) = served {
            error!("Server encountered a fatal error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        info!("Statistics gateway stopped");
        Ok(())
    }

    /// Create the Axum application with all routes and middleware
    #[must_use]
    pub fn create_app(&self) -> Router {
        let state = AppState::new(&self.gateway, self.prometheus.clone(), self.start_time);
        create_router(state, &self.config)
    }
}

/// Build the router over an existing application state
pub fn create_router(state: AppState, config: &GatewayConfig) -> Router {
    let mut app = Router::new()
        .route("/transactions", post(record_transaction))
        .route("/statistics", get(statistics))
        .route(&config.monitoring.health_path, get(health_check));

    if config.monitoring.metrics_enabled {
        app = app.route(&config.monitoring.metrics_path, get(metrics));
    }

    let mut app = app
        .with_state(state)
        .layer(timeout_layer(config))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http());

    if config.server.compression {
        app = app.layer(CompressionLayer::new());
    }

    info!("Statistics gateway routes configured successfully");
    app
}

/// Requests running past the configured timeout answer `408`
fn timeout_layer(config: &GatewayConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.server.timeout_seconds),
    )
}

async fn record_transaction(
    State(state): State<AppState>,
    query: Result<Query<TransactionParams>, QueryRejection>,
) -> Result<StatusCode, GatewayError> {
    TransactionHandlers::record(State(state.transaction_handlers), query).await
}

async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, GatewayError> {
    StatisticsHandlers::statistics(State(state.statistics_handlers)).await
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    HealthHandlers::health_check(State(state.health_handlers)).await
}

async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    HealthHandlers::metrics(State(state.health_handlers)).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl-C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

/// API route documentation
pub fn print_routes() {
    println!("Statistics Gateway Routes:");
    println!("==========================");
    println!();
    println!("Transactions:");
    println!("  POST /transactions?amount=<f64>&timestamp=<epoch-millis>");
    println!("       201 accepted, 204 older than 60s, 400 malformed");
    println!();
    println!("Statistics:");
    println!("  GET  /statistics             - sum/avg/max/min/count over the last 60s");
    println!();
    println!("Health & Monitoring:");
    println!("  GET  /health                 - Health check");
    println!("  GET  /metrics                - Prometheus metrics");
}
