//! Envelope codec
//!
//! JSON encoding of the request/response envelopes. Decoding failures are
//! always the caller's fault; encoding cannot fail.

use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

use crate::envelope::{RequestEnvelope, ResponseEnvelope};

/// Largest accepted inbound envelope (1 MiB)
pub const MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Reply used if a response envelope somehow fails to serialize
const ENCODE_FALLBACK: &[u8] = br#"{"error":true,"message":"internal error"}"#;

/// The inbound body is not a well-formed envelope
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("body must not be empty")]
    Empty,
    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },
    #[error("body contains badly-formed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("body contains an incorrect JSON type: {0}")]
    WrongType(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => DecodeError::WrongType(err),
            _ => DecodeError::Malformed(err),
        }
    }
}

/// Decode a request envelope
pub fn decode(raw: &[u8]) -> Result<RequestEnvelope, DecodeError> {
    check_size(raw)?;
    Ok(serde_json::from_slice(raw)?)
}

/// Decode a response envelope (used for backend replies and by clients)
pub fn decode_response(raw: &[u8]) -> Result<ResponseEnvelope, DecodeError> {
    check_size(raw)?;
    Ok(serde_json::from_slice(raw)?)
}

/// Encode a response envelope
pub fn encode(envelope: &ResponseEnvelope) -> Bytes {
    match serde_json::to_vec(envelope) {
        Ok(body) => Bytes::from(body),
        Err(e) => {
            warn!("[Codec] Failed to encode response envelope: {}", e);
            Bytes::from_static(ENCODE_FALLBACK)
        }
    }
}

fn check_size(raw: &[u8]) -> Result<(), DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }
    if raw.len() > MAX_ENVELOPE_BYTES {
        return Err(DecodeError::TooLarge {
            limit: MAX_ENVELOPE_BYTES,
        });
    }
    Ok(())
}
