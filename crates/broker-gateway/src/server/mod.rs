//! Gateway Server
//!
//! Inbound HTTP surface of the broker. Every route shares one [`Gateway`];
//! the server itself holds no per-request state.

mod handlers;
pub mod logging_middleware;

pub use handlers::HealthResponse;

use std::path::PathBuf;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use broker_core::{BackendConfig, ConfigError};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handler::Gateway;

/// Environment keys read by [`GatewayConfig::from_env`]
pub mod env_keys {
    pub const HOST: &str = "BROKER_HOST";
    pub const PORT: &str = "BROKER_PORT";
    pub const ENABLE_CORS: &str = "BROKER_ENABLE_CORS";
    pub const LOG_DIR: &str = "BROKER_LOG_DIR";
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS for browser access
    pub enable_cors: bool,
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
    /// Backend addresses and time bounds
    pub backends: BackendConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            backends: BackendConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(env_keys::PORT) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::PORT,
                    value,
                })?,
            None => defaults.port,
        };

        let enable_cors = match lookup(env_keys::ENABLE_CORS) {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: env_keys::ENABLE_CORS,
                value,
            })?,
            None => defaults.enable_cors,
        };

        Ok(Self {
            host: lookup(env_keys::HOST).unwrap_or(defaults.host),
            port,
            enable_cors,
            log_dir: lookup(env_keys::LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            backends: BackendConfig::from_lookup(&lookup)?,
        })
    }

    /// `host:port` for logging
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Broker HTTP server
pub struct GatewayServer {
    config: GatewayConfig,
    gateway: Gateway,
}

impl GatewayServer {
    /// Server wired to the configured backends
    pub fn new(config: GatewayConfig) -> Self {
        let gateway = Gateway::from_config(&config.backends);
        Self { config, gateway }
    }

    /// Server around an already-assembled gateway
    pub fn with_gateway(config: GatewayConfig, gateway: Gateway) -> Self {
        Self { config, gateway }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", post(handlers::broker))
            .route("/handle", post(handlers::handle_submission))
            .route("/log-grpc", post(handlers::log_grpc))
            .route("/ping", get(handlers::ping))
            .route("/health", get(handlers::health))
            .with_state(self.gateway.clone())
            .layer(TraceLayer::new_for_http())
            // Request/Response logging with body (DEBUG level)
            .layer(middleware::from_fn(
                logging_middleware::http_logging_middleware,
            ));

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Bind the configured address and serve until the process stops
    pub async fn run(self) -> anyhow::Result<()> {
        let listener =
            TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let backends = &self.config.backends;
        info!("[Gateway] Starting on {}", listener.local_addr()?);
        info!(
            "[Gateway] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "[Gateway] Backends: auth={} mail={} logger(rpc)={} logger(grpc)={} log transport={:?}",
            backends.auth_url,
            backends.mail_url,
            backends.logger_rpc_addr,
            backends.logger_grpc_url,
            backends.log_transport
        );

        let router = self.router();
        info!("[Gateway] Ready to accept connections");
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
