//! Gateway Handler
//!
//! Drives one submission through `Received → Decoded → Routed → Invoked →
//! Normalized → Sent`. Any stage may fail into the error terminal, which still
//! produces exactly one error envelope; nothing escapes this module as an
//! `Err`.

use std::fmt;

use broker_core::{
    decode, encode, BackendConfig, Fault, Payload, RequestEnvelope, ResponseEnvelope,
    ACCEPTED_STATUS,
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::adapters::AdapterSet;
use crate::dispatch::{Dispatcher, Route};
use crate::normalize::normalize;

/// Processing stage of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Decoded,
    Routed,
    Invoked,
    Normalized,
    Sent,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Decoded => "decoded",
            Stage::Routed => "routed",
            Stage::Invoked => "invoked",
            Stage::Normalized => "normalized",
            Stage::Sent => "sent",
            Stage::Error => "error",
        };
        f.write_str(name)
    }
}

/// The single reply produced for a submission
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub envelope: ResponseEnvelope,
    pub fault: Option<Fault>,
}

impl Reply {
    fn accepted(envelope: ResponseEnvelope) -> Self {
        Self {
            status: ACCEPTED_STATUS,
            envelope,
            fault: None,
        }
    }

    fn failed(fault: Fault, envelope: ResponseEnvelope) -> Self {
        Self {
            status: fault.status_code(),
            envelope,
            fault: Some(fault),
        }
    }

    /// Client-fault reply for a body that never reached the codec
    pub fn client_fault(message: impl Into<String>) -> Self {
        Self::failed(Fault::ClientFault, ResponseEnvelope::error(message))
    }

    /// Internal-fault reply for a failure outside the handler itself
    pub fn internal_fault(message: impl Into<String>) -> Self {
        Self::failed(Fault::InternalFault, ResponseEnvelope::error(message))
    }

    /// Encoded envelope
    pub fn body(&self) -> Bytes {
        encode(&self.envelope)
    }
}

/// Decode, dispatch, invoke, normalize
///
/// Cheap to clone; every request task holds its own handle on the shared
/// read-only route table and adapters.
#[derive(Clone)]
pub struct Gateway {
    dispatcher: Dispatcher,
    adapters: AdapterSet,
}

impl Gateway {
    pub fn new(dispatcher: Dispatcher, adapters: AdapterSet) -> Self {
        Self {
            dispatcher,
            adapters,
        }
    }

    /// Gateway wired to the configured backends with the real adapters
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(Dispatcher::new(config), AdapterSet::from_config(config))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one submission
    pub async fn handle(&self, raw: &[u8]) -> Reply {
        transition(Stage::Received, raw.len());

        let envelope = match self.decode(raw) {
            Ok(envelope) => envelope,
            Err(reply) => return reply,
        };

        let route = match self.dispatcher.resolve(&envelope.action) {
            Ok(route) => route,
            Err(e) => {
                debug!("[Gateway] {} -> {}: {:?}", Stage::Decoded, Stage::Error, e.action);
                return Reply::failed(Fault::ClientFault, ResponseEnvelope::error(e.to_string()));
            }
        };
        transition(Stage::Routed, route);

        let payload = envelope.into_payload(route.action);
        self.invoke(route, payload).await
    }

    /// Handle a submission whose log payload always takes the structured-RPC route
    pub async fn handle_structured_log(&self, raw: &[u8]) -> Reply {
        transition(Stage::Received, raw.len());

        let envelope = match self.decode(raw) {
            Ok(envelope) => envelope,
            Err(reply) => return reply,
        };

        let route = self.dispatcher.structured_log_route();
        transition(Stage::Routed, route);

        self.invoke(route, Payload::Log(envelope.log)).await
    }

    fn decode(&self, raw: &[u8]) -> Result<RequestEnvelope, Reply> {
        match decode(raw) {
            Ok(envelope) => {
                debug!("[Gateway] {} (action={:?})", Stage::Decoded, envelope.action);
                Ok(envelope)
            }
            Err(e) => {
                debug!("[Gateway] {} -> {}: {}", Stage::Received, Stage::Error, e);
                Err(Reply::failed(
                    Fault::ClientFault,
                    ResponseEnvelope::error(e.to_string()),
                ))
            }
        }
    }

    async fn invoke(&self, route: &Route, payload: Payload) -> Reply {
        let adapter = self.adapters.for_protocol(route.protocol);
        let outcome = adapter.invoke(route, &payload).await;
        transition(Stage::Invoked, &outcome.code);

        let normalized = normalize(&outcome, route, &payload);
        transition(Stage::Normalized, normalized.status());

        let reply = match normalized.fault {
            None => Reply::accepted(normalized.envelope),
            Some(fault) => Reply::failed(fault, normalized.envelope),
        };

        match reply.fault {
            None => info!(
                "[Gateway] {} via {} -> {}",
                route.action, route.protocol, reply.status
            ),
            Some(fault) => warn!(
                "[Gateway] {} via {} -> {} ({}: {})",
                route.action, route.protocol, reply.status, fault, reply.envelope.message
            ),
        }
        transition(Stage::Sent, reply.status);
        reply
    }
}

fn transition(stage: Stage, detail: impl fmt::Debug) {
    debug!("[Gateway] {} {:?}", stage, detail);
}
