//! cryptick market ticker - entry point.

use anyhow::Result;
use clap::Parser;
use cryptick_app::{AppConfig, Application, LogAlertSink, LogDisplaySink};
use std::path::Path;
use tracing::{info, warn};

/// Streaming crypto market ticker with price alerts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CRYPTICK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    cryptick_ws::init_crypto();

    let args = Args::parse();

    cryptick_telemetry::init_logging()?;

    info!("Starting cryptick v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > CRYPTICK_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("CRYPTICK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        info!(config_path = %config_path, "Loading configuration");
        AppConfig::from_file(&config_path)?
    } else {
        warn!(config_path = %config_path, "Config file not found, using defaults");
        AppConfig::default()
    };

    let app = Application::new(
        config,
        Box::new(LogDisplaySink),
        Box::new(LogAlertSink),
    )?;

    app.run().await?;

    Ok(())
}
