//! `stats-gateway` binary: load configuration and serve until signalled

use anyhow::Result;
use clap::{Arg, Command};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stats_gateway::{GatewayConfig, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stats_gateway=info,txn_window=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let matches = Command::new("stats-gateway")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Real-time transaction statistics over the last 60 seconds")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("gateway.toml"),
        )
        .arg(
            Arg::new("routes")
                .long("routes")
                .help("Print available routes and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("routes") {
        stats_gateway::server::print_routes();
        return Ok(());
    }

    // Load configuration
    let default_config = "gateway.toml".to_string();
    let config_path = matches
        .get_one::<String>("config")
        .unwrap_or(&default_config);
    let config = match GatewayConfig::from_file(config_path) {
        Ok(config) => {
            info!("Loaded configuration from: {}", config_path);
            config
        }
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path, e);
            info!("Using default configuration");
            GatewayConfig::default()
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %config.server_address(),
        write_mode = ?config.writer.mode,
        workers = config.writer.workers,
        queue_capacity = config.writer.queue_capacity,
        "Starting statistics gateway"
    );

    if let Err(e) = start_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
