//! Downstream outcome
//!
//! The protocol-neutral result every adapter produces, whatever wire protocol
//! it speaks. The normalizer only ever sees this shape.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// HTTP status a backend uses to reject credentials
pub const HTTP_UNAUTHORIZED: u16 = 401;

/// Status or code reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCode {
    /// HTTP status code
    Http(u16),
    /// Binary call completed (the protocol has no status codes)
    Call,
    /// Structured-RPC status code (0 = OK)
    Grpc(i32),
    /// The backend never answered
    NoReply,
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeCode::Http(status) => write!(f, "http {}", status),
            OutcomeCode::Call => f.write_str("call"),
            OutcomeCode::Grpc(code) => write!(f, "grpc {}", code),
            OutcomeCode::NoReply => f.write_str("no reply"),
        }
    }
}

/// Failure to complete the exchange with a backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("deadline of {0}ms exceeded")]
    Timeout(u64),
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("remote error: {0}")]
    Remote(String),
    /// The route asks an adapter for an operation it cannot perform
    #[error("operation {operation} cannot carry a {action} payload")]
    Unsupported { operation: String, action: String },
}

/// Result of one downstream call
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamOutcome {
    pub succeeded: bool,
    pub code: OutcomeCode,
    pub body: Option<Value>,
    pub transport_error: Option<TransportError>,
}

impl DownstreamOutcome {
    /// The backend accepted the call
    pub fn success(code: OutcomeCode, body: Option<Value>) -> Self {
        Self {
            succeeded: true,
            code,
            body,
            transport_error: None,
        }
    }

    /// The backend answered but rejected the call
    pub fn rejected(code: OutcomeCode) -> Self {
        Self {
            succeeded: false,
            code,
            body: None,
            transport_error: None,
        }
    }

    /// The exchange itself failed
    pub fn transport(code: OutcomeCode, error: TransportError) -> Self {
        Self {
            succeeded: false,
            code,
            body: None,
            transport_error: Some(error),
        }
    }

    /// Backend answered with the HTTP "unauthorized" status
    pub fn is_unauthorized(&self) -> bool {
        self.code == OutcomeCode::Http(HTTP_UNAUTHORIZED)
    }
}
