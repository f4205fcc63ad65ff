//! Backend configuration
//!
//! One fixed address per backend. Defaults match the container deployment;
//! every value can be overridden from the environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable names
pub mod env_keys {
    pub const AUTH_SERVICE_URL: &str = "AUTH_SERVICE_URL";
    pub const MAIL_SERVICE_URL: &str = "MAIL_SERVICE_URL";
    pub const LOGGER_RPC_ADDR: &str = "LOGGER_RPC_ADDR";
    pub const LOGGER_GRPC_URL: &str = "LOGGER_GRPC_URL";
    pub const LOG_TRANSPORT: &str = "LOG_TRANSPORT";
    pub const HTTP_TIMEOUT_MS: &str = "HTTP_TIMEOUT_MS";
    pub const RPC_TIMEOUT_MS: &str = "RPC_TIMEOUT_MS";
    pub const GRPC_DEADLINE_MS: &str = "GRPC_DEADLINE_MS";
}

pub const DEFAULT_AUTH_SERVICE_URL: &str = "http://authentication-service/authenticate";
pub const DEFAULT_MAIL_SERVICE_URL: &str = "http://mailer-service/send";
pub const DEFAULT_LOGGER_RPC_ADDR: &str = "logger-service:5001";
pub const DEFAULT_LOGGER_GRPC_URL: &str = "http://logger-service:50001";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: invalid URL {value:?}: {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{key}: unsupported URL scheme {scheme:?}")]
    UnsupportedScheme { key: &'static str, scheme: String },
    #[error("{key}: invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which protocol serves the "log" action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTransport {
    /// Length-prefixed binary call protocol
    #[default]
    Rpc,
    /// Structured schema-based RPC
    Grpc,
}

impl FromStr for LogTransport {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpc" => Ok(LogTransport::Rpc),
            "grpc" => Ok(LogTransport::Grpc),
            _ => Err(()),
        }
    }
}

/// Addresses and per-protocol time bounds for the backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Authentication service verify endpoint
    pub auth_url: String,
    /// Mail service send endpoint
    pub mail_url: String,
    /// Logger binary-RPC listener (`host:port`)
    pub logger_rpc_addr: String,
    /// Logger structured-RPC endpoint
    pub logger_grpc_url: String,
    /// Route variant used for the "log" action
    pub log_transport: LogTransport,
    /// Whole-call timeout for HTTP backends
    pub http_timeout: Duration,
    /// Whole-call timeout for binary-RPC backends
    pub rpc_timeout: Duration,
    /// Deadline for structured-RPC calls, connection included
    pub grpc_deadline: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_SERVICE_URL.to_string(),
            mail_url: DEFAULT_MAIL_SERVICE_URL.to_string(),
            logger_rpc_addr: DEFAULT_LOGGER_RPC_ADDR.to_string(),
            logger_grpc_url: DEFAULT_LOGGER_GRPC_URL.to_string(),
            log_transport: LogTransport::default(),
            http_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(10),
            grpc_deadline: Duration::from_secs(1),
        }
    }
}

impl BackendConfig {
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
        let config = Self {
            auth_url: lookup(env_keys::AUTH_SERVICE_URL).unwrap_or(defaults.auth_url),
            mail_url: lookup(env_keys::MAIL_SERVICE_URL).unwrap_or(defaults.mail_url),
            logger_rpc_addr: lookup(env_keys::LOGGER_RPC_ADDR)
                .unwrap_or(defaults.logger_rpc_addr),
            logger_grpc_url: lookup(env_keys::LOGGER_GRPC_URL)
                .unwrap_or(defaults.logger_grpc_url),
            log_transport: match lookup(env_keys::LOG_TRANSPORT) {
                Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::LOG_TRANSPORT,
                    value,
                })?,
                None => defaults.log_transport,
            },
            http_timeout: parse_millis(&lookup, env_keys::HTTP_TIMEOUT_MS)?
                .unwrap_or(defaults.http_timeout),
            rpc_timeout: parse_millis(&lookup, env_keys::RPC_TIMEOUT_MS)?
                .unwrap_or(defaults.rpc_timeout),
            grpc_deadline: parse_millis(&lookup, env_keys::GRPC_DEADLINE_MS)?
                .unwrap_or(defaults.grpc_deadline),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every HTTP-style address is an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url(env_keys::AUTH_SERVICE_URL, &self.auth_url)?;
        check_http_url(env_keys::MAIL_SERVICE_URL, &self.mail_url)?;
        check_http_url(env_keys::LOGGER_GRPC_URL, &self.logger_grpc_url)?;
        if self.logger_rpc_addr.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: env_keys::LOGGER_RPC_ADDR,
                value: self.logger_rpc_addr.clone(),
            });
        }
        Ok(())
    }
}

/// Parse a millisecond value from the lookup; zero is rejected
pub fn parse_millis<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
    }
}

fn check_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::UnsupportedScheme {
            key,
            scheme: scheme.to_string(),
        }),
    }
}
