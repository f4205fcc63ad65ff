//! Call protocol client

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::debug;

use super::{decode_message, encode_message, frame_codec, CallRequest, CallResponse, RpcError};

/// A single client connection
///
/// The connection is closed when the client is dropped.
pub struct RpcClient {
    framed: Framed<TcpStream, LengthDelimitedCodec>,
    next_seq: u64,
    peer: String,
}

impl RpcClient {
    /// Open a connection to `addr` (`host:port`)
    pub async fn dial(addr: &str) -> Result<Self, RpcError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| RpcError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;

        debug!("[RpcClient] Connected to {}", addr);

        Ok(Self {
            framed: Framed::new(stream, frame_codec()),
            next_seq: 0,
            peer: addr.to_string(),
        })
    }

    /// Address this client dialed
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Invoke `method` with `args` and wait for its reply
    pub async fn call<A, R>(&mut self, method: &str, args: &A) -> Result<R, RpcError>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let seq = self.next_seq;
        self.next_seq += 1;

        let request = CallRequest {
            seq,
            method: method.to_string(),
            args: postcard::to_allocvec(args)?,
        };
        self.framed.send(encode_message(&request)?).await?;

        let frame = self.framed.next().await.ok_or(RpcError::Closed)??;
        let response: CallResponse = decode_message(&frame)?;

        if response.seq != seq {
            return Err(RpcError::SequenceMismatch {
                expected: seq,
                got: response.seq,
            });
        }
        if let Some(error) = response.error {
            return Err(RpcError::Remote(error));
        }

        debug!(
            "[RpcClient] {} seq={} replied ({} bytes)",
            method,
            seq,
            response.reply.len()
        );
        decode_message(&response.reply)
    }
}
