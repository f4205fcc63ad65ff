//! Downstream adapters
//!
//! One adapter per wire protocol, all behind the [`Adapter`] trait. Each
//! adapter owns its protocol's concerns entirely and reports back a
//! protocol-neutral [`DownstreamOutcome`]; a new protocol only needs a new
//! adapter and an entry in [`AdapterSet`].

mod binary_rpc;
mod http;
mod structured_rpc;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use broker_core::{BackendConfig, DownstreamOutcome, Payload};

pub use binary_rpc::BinaryRpcAdapter;
pub use http::HttpAdapter;
pub use structured_rpc::StructuredRpcAdapter;

use crate::dispatch::{Protocol, Route};

/// Invoke a named remote operation with a payload
///
/// Implementations never return errors: every failure is folded into the
/// outcome's `transport_error`. Any connection opened for the call is released
/// before `invoke` returns, or when its future is dropped.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn invoke(&self, route: &Route, payload: &Payload) -> DownstreamOutcome;

    /// Protocol this adapter speaks
    fn protocol(&self) -> Protocol;
}

/// The adapter for every protocol
#[derive(Clone)]
pub struct AdapterSet {
    http: Arc<dyn Adapter>,
    binary_rpc: Arc<dyn Adapter>,
    structured_rpc: Arc<dyn Adapter>,
}

impl AdapterSet {
    /// Adapters bounded by the configured per-protocol time limits
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            http: Arc::new(HttpAdapter::new(config.http_timeout)),
            binary_rpc: Arc::new(BinaryRpcAdapter::new(config.rpc_timeout)),
            structured_rpc: Arc::new(StructuredRpcAdapter::new(config.grpc_deadline)),
        }
    }

    /// Assemble from explicit adapters (tests swap in fakes here)
    pub fn new(
        http: Arc<dyn Adapter>,
        binary_rpc: Arc<dyn Adapter>,
        structured_rpc: Arc<dyn Adapter>,
    ) -> Self {
        Self {
            http,
            binary_rpc,
            structured_rpc,
        }
    }

    /// Adapter serving `protocol`
    pub fn for_protocol(&self, protocol: Protocol) -> &dyn Adapter {
        match protocol {
            Protocol::Http => self.http.as_ref(),
            Protocol::BinaryRpc => self.binary_rpc.as_ref(),
            Protocol::StructuredRpc => self.structured_rpc.as_ref(),
        }
    }
}

impl Default for AdapterSet {
    fn default() -> Self {
        Self::from_config(&BackendConfig::default())
    }
}

/// Milliseconds in a duration, for timeout reporting
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
