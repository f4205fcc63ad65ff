//! Response Normalizer
//!
//! Folds every [`DownstreamOutcome`] into a fully-populated
//! [`ResponseEnvelope`] plus the fault class that decides the reply status.
//! Pure: the same outcome always yields the same envelope.

use broker_core::{
    ActionKind, DownstreamOutcome, Fault, Payload, ResponseEnvelope, TransportError,
    ACCEPTED_STATUS,
};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::{Protocol, Route};

pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const AUTHENTICATED: &str = "Authenticated";
pub const MAIL_SENT_PREFIX: &str = "email sended to";

/// A normalized reply and its fault class (`None` on success)
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub envelope: ResponseEnvelope,
    pub fault: Option<Fault>,
}

impl Normalized {
    fn accepted(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            fault: None,
        }
    }

    fn failed(fault: Fault, message: impl Into<String>) -> Self {
        Self {
            envelope: ResponseEnvelope::error(message),
            fault: Some(fault),
        }
    }

    /// HTTP status for the reply
    pub fn status(&self) -> u16 {
        self.fault
            .map(|fault| fault.status_code())
            .unwrap_or(ACCEPTED_STATUS)
    }
}

/// Map a downstream outcome to the reply sent to the caller
pub fn normalize(outcome: &DownstreamOutcome, route: &Route, payload: &Payload) -> Normalized {
    if let Some(error) = &outcome.transport_error {
        debug!(
            "[Normalize] {} transport error ({}): {}",
            route.action, outcome.code, error
        );
        return match error {
            TransportError::Unsupported { .. } => {
                Normalized::failed(Fault::InternalFault, "internal error")
            }
            _ => Normalized::failed(Fault::UpstreamUnavailable, unreachable_message(route)),
        };
    }

    if !outcome.succeeded {
        if outcome.is_unauthorized() {
            return Normalized::failed(Fault::UpstreamUnauthorized, INVALID_CREDENTIALS);
        }
        debug!("[Normalize] {} rejected with {}", route.action, outcome.code);
        return Normalized::failed(Fault::UpstreamUnavailable, rejection_message(route.action));
    }

    match payload {
        Payload::Auth(_) => unwrap_auth_reply(outcome.body.as_ref(), route),
        Payload::Mail(mail) => {
            Normalized::accepted(ResponseEnvelope::ok(format!("{}{}", MAIL_SENT_PREFIX, mail.to)))
        }
        Payload::Log(_) => {
            // Only the binary call's reply text is surfaced; WriteLog's result is not.
            let message = match (route.protocol, &outcome.body) {
                (Protocol::BinaryRpc, Some(Value::String(result))) if !result.is_empty() => {
                    result.clone()
                }
                _ => format!("logged via {}", route.protocol),
            };
            Normalized::accepted(ResponseEnvelope::ok(message))
        }
    }
}

/// The auth backend wraps its answer in its own envelope; an accepted reply can
/// still carry a business failure.
fn unwrap_auth_reply(body: Option<&Value>, route: &Route) -> Normalized {
    let reply = body
        .cloned()
        .map(serde_json::from_value::<ResponseEnvelope>);

    match reply {
        Some(Ok(reply)) if reply.error => {
            Normalized::failed(Fault::UpstreamUnauthorized, reply.message)
        }
        Some(Ok(reply)) => {
            Normalized::accepted(ResponseEnvelope::ok_with_data(AUTHENTICATED, reply.data))
        }
        Some(Err(e)) => {
            debug!("[Normalize] Auth reply is not an envelope: {}", e);
            Normalized::failed(Fault::UpstreamUnavailable, unreachable_message(route))
        }
        None => {
            debug!("[Normalize] Auth reply has no body");
            Normalized::failed(Fault::UpstreamUnavailable, unreachable_message(route))
        }
    }
}

fn unreachable_message(route: &Route) -> String {
    format!("could not reach {} service", route.service)
}

fn rejection_message(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Auth => "error calling auth service",
        ActionKind::Log => "error calling logger service",
        ActionKind::Mail => "error on mail service",
    }
}
