//! Broker service entry point
//!
//! Loads `.env`, reads configuration from the environment, starts logging and
//! serves the gateway until the process is stopped.

use std::path::Path;

use anyhow::Context;
use broker_gateway::{GatewayConfig, GatewayServer};
use tracing::info;

/// Prefix of the rolling log files (`broker.2026-01-22.log`)
const LOG_PREFIX: &str = "broker";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env().context("invalid broker configuration")?;

    // Must stay alive for the whole run or buffered file logs are lost
    let _guard = init_tracing(&config.log_dir)?;

    info!(
        "[Broker] Starting v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_address()
    );

    GatewayServer::new(config).run().await
}

/// Initialize tracing with a console layer and a daily rolling file
fn init_tracing(logs_dir: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
    }

    // File appender with daily rotation
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(logs_dir)
        .context("failed to create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence over the defaults for our crates
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info")
            .add_directive("broker=debug".parse()?)
            .add_directive("broker_core=debug".parse()?)
            .add_directive("broker_gateway=debug".parse()?)
            .add_directive("broker_rpc=debug".parse()?)
            .add_directive("tower_http=info".parse()?)
            .add_directive("h2=warn".parse()?),
    };

    // Console layer: colored, compact
    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    // File layer: no colors, include more detail
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
