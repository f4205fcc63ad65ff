//! Action Dispatcher
//!
//! Maps an action to the route that serves it. The table is built once from
//! configuration and only read afterwards, so it is shared freely between
//! request tasks.

use std::fmt;

use broker_core::{ActionKind, BackendConfig, LogTransport, UnknownAction};
use tracing::debug;

/// Wire protocol an adapter speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// JSON document over HTTP
    Http,
    /// Length-prefixed binary call protocol
    BinaryRpc,
    /// Schema-based structured RPC
    StructuredRpc,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Protocol::Http => "HTTP",
            Protocol::BinaryRpc => "RPC",
            Protocol::StructuredRpc => "gRPC",
        };
        f.write_str(label)
    }
}

/// Resolved (adapter, address, operation) for one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub action: ActionKind,
    pub protocol: Protocol,
    /// Backend address: a URL for HTTP and structured RPC, `host:port` for binary RPC
    pub address: String,
    /// Remote operation name
    pub operation: String,
    /// Backend name used in messages
    pub service: &'static str,
}

/// Operation names
pub mod operations {
    pub const AUTHENTICATE: &str = "authenticate";
    pub const SEND_MAIL: &str = "send";
    pub const LOG_INFO: &str = broker_rpc::LOG_INFO;
    pub const WRITE_LOG: &str = "WriteLog";
}

/// Read-only action → route table
#[derive(Debug, Clone)]
pub struct Dispatcher {
    auth: Route,
    log: Route,
    mail: Route,
    structured_log: Route,
}

impl Dispatcher {
    pub fn new(config: &BackendConfig) -> Self {
        let binary_log = Route {
            action: ActionKind::Log,
            protocol: Protocol::BinaryRpc,
            address: config.logger_rpc_addr.clone(),
            operation: operations::LOG_INFO.to_string(),
            service: "logger",
        };
        let structured_log = Route {
            action: ActionKind::Log,
            protocol: Protocol::StructuredRpc,
            address: config.logger_grpc_url.clone(),
            operation: operations::WRITE_LOG.to_string(),
            service: "logger",
        };
        let log = match config.log_transport {
            LogTransport::Rpc => binary_log,
            LogTransport::Grpc => structured_log.clone(),
        };

        debug!(
            "[Dispatch] Route table: auth={} log={}({}) mail={}",
            config.auth_url, log.address, log.protocol, config.mail_url
        );

        Self {
            auth: Route {
                action: ActionKind::Auth,
                protocol: Protocol::Http,
                address: config.auth_url.clone(),
                operation: operations::AUTHENTICATE.to_string(),
                service: "auth",
            },
            log,
            mail: Route {
                action: ActionKind::Mail,
                protocol: Protocol::Http,
                address: config.mail_url.clone(),
                operation: operations::SEND_MAIL.to_string(),
                service: "mail",
            },
            structured_log,
        }
    }

    /// Resolve an action string to its route
    pub fn resolve(&self, action: &str) -> Result<&Route, UnknownAction> {
        let kind: ActionKind = action.parse()?;
        Ok(self.route(kind))
    }

    /// Route for an already-parsed action
    pub fn route(&self, kind: ActionKind) -> &Route {
        match kind {
            ActionKind::Auth => &self.auth,
            ActionKind::Log => &self.log,
            ActionKind::Mail => &self.mail,
        }
    }

    /// Structured-RPC log route, regardless of the configured log transport
    pub fn structured_log_route(&self) -> &Route {
        &self.structured_log
    }
}
