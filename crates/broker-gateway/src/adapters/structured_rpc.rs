//! Structured RPC adapter
//!
//! Connects to `logs.LogService` and calls `WriteLog` under one deadline that
//! covers connecting, sending and waiting for the reply. Deadline expiry and
//! remote failure are both reported as transport errors. The channel is
//! scoped to the call and dropped on every exit path.

use std::time::Duration;

use async_trait::async_trait;
use broker_core::{DownstreamOutcome, OutcomeCode, Payload, TransportError};
use broker_rpc::logs::{Log, LogRequest};
use broker_rpc::LogServiceClient;
use serde_json::Value;
use tonic::transport::Endpoint;
use tracing::{debug, warn};

use super::{millis, Adapter};
use crate::dispatch::{operations, Protocol, Route};

pub struct StructuredRpcAdapter {
    deadline: Duration,
}

/// Why a structured call failed
enum CallFailure {
    Connect(String),
    Status(tonic::Status),
}

impl StructuredRpcAdapter {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    async fn write_log(&self, address: &str, entry: Log) -> Result<String, CallFailure> {
        let endpoint = Endpoint::from_shared(address.to_string())
            .map_err(|e| CallFailure::Connect(e.to_string()))?
            .connect_timeout(self.deadline);
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| CallFailure::Connect(e.to_string()))?;

        let mut client = LogServiceClient::new(channel);
        let mut request = tonic::Request::new(LogRequest {
            log_entry: Some(entry),
        });
        // Propagated to the logger as `grpc-timeout`; the caller enforces it locally.
        request.set_timeout(self.deadline);

        let response = client.write_log(request).await.map_err(CallFailure::Status)?;
        Ok(response.into_inner().result)
    }
}

#[async_trait]
impl Adapter for StructuredRpcAdapter {
    async fn invoke(&self, route: &Route, payload: &Payload) -> DownstreamOutcome {
        let entry = match (route.operation.as_str(), payload) {
            (operations::WRITE_LOG, Payload::Log(log)) => Log {
                name: log.name.clone(),
                data: log.data.clone(),
            },
            (operation, other) => {
                return DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Unsupported {
                        operation: operation.to_string(),
                        action: other.kind().to_string(),
                    },
                )
            }
        };

        debug!(
            "[GrpcAdapter] {} -> {} (deadline {:?})",
            route.operation, route.address, self.deadline
        );

        match tokio::time::timeout(self.deadline, self.write_log(&route.address, entry)).await {
            Ok(Ok(result)) => DownstreamOutcome::success(
                OutcomeCode::Grpc(tonic::Code::Ok as i32),
                Some(Value::String(result)),
            ),
            Ok(Err(CallFailure::Connect(message))) => {
                warn!("[GrpcAdapter] {} unreachable: {}", route.address, message);
                DownstreamOutcome::transport(OutcomeCode::NoReply, TransportError::Connect(message))
            }
            Ok(Err(CallFailure::Status(status))) => {
                warn!(
                    "[GrpcAdapter] {} failed: {:?} {}",
                    route.operation,
                    status.code(),
                    status.message()
                );
                let error = match status.code() {
                    tonic::Code::DeadlineExceeded => TransportError::Timeout(millis(self.deadline)),
                    _ => TransportError::Remote(status.message().to_string()),
                };
                DownstreamOutcome::transport(OutcomeCode::Grpc(status.code() as i32), error)
            }
            Err(_) => {
                warn!(
                    "[GrpcAdapter] {} on {} exceeded deadline {:?}",
                    route.operation, route.address, self.deadline
                );
                DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Timeout(millis(self.deadline)),
                )
            }
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::StructuredRpc
    }
}
