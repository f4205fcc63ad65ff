//! Binary RPC adapter
//!
//! Dials the route's `host:port`, makes one named-procedure call and hangs
//! up. No reply error means success; any call error becomes a transport error.

use std::time::Duration;

use async_trait::async_trait;
use broker_core::{DownstreamOutcome, OutcomeCode, Payload, TransportError};
use broker_rpc::{RpcClient, RpcError, RpcPayload};
use serde_json::Value;
use tracing::{debug, warn};

use super::{millis, Adapter};
use crate::dispatch::{Protocol, Route};

pub struct BinaryRpcAdapter {
    timeout: Duration,
}

impl BinaryRpcAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn call(&self, route: &Route, args: RpcPayload) -> Result<String, RpcError> {
        // The client owns the socket; it closes when this future completes or is dropped.
        let mut client = RpcClient::dial(&route.address).await?;
        client.call(&route.operation, &args).await
    }
}

#[async_trait]
impl Adapter for BinaryRpcAdapter {
    async fn invoke(&self, route: &Route, payload: &Payload) -> DownstreamOutcome {
        let args = match payload {
            Payload::Log(log) => RpcPayload {
                name: log.name.clone(),
                data: log.data.clone(),
            },
            other => {
                return DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Unsupported {
                        operation: route.operation.clone(),
                        action: other.kind().to_string(),
                    },
                )
            }
        };

        debug!("[RpcAdapter] {} -> {}", route.operation, route.address);

        match tokio::time::timeout(self.timeout, self.call(route, args)).await {
            Ok(Ok(result)) => {
                DownstreamOutcome::success(OutcomeCode::Call, Some(Value::String(result)))
            }
            Ok(Err(e)) => {
                warn!("[RpcAdapter] {} on {} failed: {}", route.operation, route.address, e);
                let code = match e {
                    RpcError::Connect { .. } => OutcomeCode::NoReply,
                    _ => OutcomeCode::Call,
                };
                DownstreamOutcome::transport(code, to_transport_error(e))
            }
            Err(_) => {
                warn!(
                    "[RpcAdapter] {} on {} timed out after {:?}",
                    route.operation, route.address, self.timeout
                );
                DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Timeout(millis(self.timeout)),
                )
            }
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::BinaryRpc
    }
}

fn to_transport_error(err: RpcError) -> TransportError {
    match err {
        RpcError::Connect { .. } => TransportError::Connect(err.to_string()),
        RpcError::Remote(message) => TransportError::Remote(message),
        RpcError::Io(_) | RpcError::Encoding(_) | RpcError::Closed => {
            TransportError::Malformed(err.to_string())
        }
        RpcError::SequenceMismatch { .. } => TransportError::Malformed(err.to_string()),
    }
}
