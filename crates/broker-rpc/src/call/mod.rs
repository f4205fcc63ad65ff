//! Length-prefixed binary call protocol
//!
//! One TCP connection carries a sequence of calls. Every message is a single
//! frame: a 4-byte big-endian length followed by a postcard-encoded body.
//!
//! - request: `CallRequest { seq, method, args }`
//! - response: `CallResponse { seq, error, reply }`
//!
//! `args` and `reply` are postcard encodings of the procedure's own argument
//! and result types, so the envelope never needs to know them.

mod client;
mod server;

pub use client::RpcClient;
pub use server::RpcServer;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::codec::LengthDelimitedCodec;

/// Largest frame either side will accept (8 MiB)
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Errors raised by either end of a call
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("dial {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding: {0}")]
    Encoding(#[from] postcard::Error),
    #[error("connection closed before a reply arrived")]
    Closed,
    #[error("reply sequence {got} does not match request {expected}")]
    SequenceMismatch { expected: u64, got: u64 },
    /// The procedure itself returned an error
    #[error("{0}")]
    Remote(String),
}

/// A call as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub seq: u64,
    pub method: String,
    pub args: Vec<u8>,
}

/// A reply as sent on the wire; `error` set means the call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResponse {
    pub seq: u64,
    pub error: Option<String>,
    pub reply: Vec<u8>,
}

/// Frame codec shared by client and server
pub fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_BYTES)
        .new_codec()
}

/// Encode a message body for one frame
pub fn encode_message<T: Serialize>(message: &T) -> Result<Bytes, RpcError> {
    Ok(Bytes::from(postcard::to_allocvec(message)?))
}

/// Decode a message body from one frame
pub fn decode_message<T: DeserializeOwned>(frame: &[u8]) -> Result<T, RpcError> {
    Ok(postcard::from_bytes(frame)?)
}
