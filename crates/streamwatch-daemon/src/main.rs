//! streamwatch daemon - registry to monitor synchronization service
//!
//! The daemon provides:
//! - Periodic reconciliation of registry streams into the HLS monitor
//! - A liveness endpoint for external health checks

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use streamwatch_daemon::error::{DaemonError, DaemonResult};
use streamwatch_daemon::{DaemonConfig, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// streamwatch daemon CLI
#[derive(Parser)]
#[command(name = "streamwatchd")]
#[command(about = "Keeps an HLS monitor's watch-list in sync with a stream registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STREAMWATCH_CONFIG")]
    config: Option<String>,

    /// Listen host
    #[arg(long, env = "HOST")]
    host: Option<IpAddr>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(long, env = "STREAMWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "STREAMWATCH_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    let listen = config.server.listen_addr;
    config.server.listen_addr = SocketAddr::new(
        cli.host.unwrap_or(listen.ip()),
        cli.port.unwrap_or(listen.port()),
    );

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        interval_secs = config.scheduler.interval_secs,
        "Starting streamwatchd"
    );

    let server = Server::new(config)?;
    server.run().await
}
