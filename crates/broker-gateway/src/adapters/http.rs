//! HTTP adapter
//!
//! POSTs the payload as a JSON document to the route's URL. Only 202 Accepted
//! is success; every other status, 200 included, is a rejection carrying that
//! status, so the normalizer can tell "unauthorized" apart from everything else.

use std::time::Duration;

use async_trait::async_trait;
use broker_core::{DownstreamOutcome, OutcomeCode, Payload, TransportError, ACCEPTED_STATUS};
use serde_json::Value;
use tracing::{debug, warn};

use super::{millis, Adapter};
use crate::dispatch::{Protocol, Route};

pub struct HttpAdapter {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpAdapter {
    pub fn new(timeout: Duration) -> Self {
        // No idle connections are kept: every call opens and releases its own.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|e| {
                warn!("[HttpAdapter] Falling back to default client: {}", e);
                reqwest::Client::new()
            });
        Self { client, timeout }
    }

    async fn exchange(&self, route: &Route, payload: &Payload) -> DownstreamOutcome {
        let response = match self.client.post(&route.address).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("[HttpAdapter] {} unreachable: {}", route.address, e);
                return DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Connect(e.to_string()),
                );
            }
        };

        let status = response.status();
        let code = OutcomeCode::Http(status.as_u16());
        if status.as_u16() != ACCEPTED_STATUS {
            debug!("[HttpAdapter] {} rejected with {}", route.address, status);
            return DownstreamOutcome::rejected(code);
        }

        match response.bytes().await {
            Ok(body) => DownstreamOutcome::success(code, parse_body(&body)),
            Err(e) => {
                warn!("[HttpAdapter] Failed to read body from {}: {}", route.address, e);
                DownstreamOutcome::transport(code, TransportError::Malformed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Adapter for HttpAdapter {
    async fn invoke(&self, route: &Route, payload: &Payload) -> DownstreamOutcome {
        debug!("[HttpAdapter] POST {} ({})", route.address, route.action);

        match tokio::time::timeout(self.timeout, self.exchange(route, payload)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "[HttpAdapter] {} timed out after {:?}",
                    route.address, self.timeout
                );
                DownstreamOutcome::transport(
                    OutcomeCode::NoReply,
                    TransportError::Timeout(millis(self.timeout)),
                )
            }
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::Http
    }
}

/// Empty → none, JSON → that value, anything else → the raw text
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}
