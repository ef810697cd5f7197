//! devreg Daemon - Main entry point
//!
//! Serves the device registry REST API.

mod api;
mod auth;
mod config;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "devreg")]
#[command(about = "Device registry REST service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "devreg.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file to the config path and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("devreg v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        if args.config.exists() {
            anyhow::bail!(
                "Refusing to overwrite existing configuration: {}",
                args.config.display()
            );
        }
        config::save_default_config(&args.config)?;
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    info!(
        bind = %config.daemon.bind,
        store = ?config.store.backend,
        strict_patch = config.registry.strict_patch,
        auth = config.auth.require_token,
        "Configuration loaded"
    );

    let state = state::AppState::new(config.clone())?;

    server::run(state, &config.daemon.bind, config.daemon.tls.as_ref()).await
}
