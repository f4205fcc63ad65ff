//! Call protocol server
//!
//! Procedures are registered by name with typed arguments and results. Each
//! accepted connection is served on its own task; calls on one connection are
//! answered in order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{FutureExt, SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::{decode_message, encode_message, frame_codec, CallRequest, CallResponse, RpcError};

type Procedure = Arc<dyn Fn(Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, String>> + Send + Sync>;

/// Registry of named procedures plus the accept loop
#[derive(Clone, Default)]
pub struct RpcServer {
    procedures: HashMap<String, Procedure>,
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure under `method`
    ///
    /// An `Err` from the handler is sent back as the call's error text.
    pub fn register<A, R, F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, String>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let procedure: Procedure = Arc::new(move |raw_args: Vec<u8>| {
            let handler = Arc::clone(&handler);
            async move {
                let args: A = postcard::from_bytes(&raw_args)
                    .map_err(|e| format!("rpc: cannot decode arguments: {}", e))?;
                let reply = (handler.as_ref())(args).await?;
                postcard::to_allocvec(&reply)
                    .map_err(|e| format!("rpc: cannot encode reply: {}", e))
            }
            .boxed()
        });
        self.procedures.insert(method.into(), procedure);
        self
    }

    /// Names of the registered procedures
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    /// Accept connections until the listener fails
    pub async fn serve(self, listener: TcpListener) -> Result<(), RpcError> {
        let procedures = Arc::new(self.procedures);
        if let Ok(addr) = listener.local_addr() {
            info!("[RpcServer] Listening on {}", addr);
        }

        loop {
            let (stream, peer) = listener.accept().await?;
            debug!("[RpcServer] Accepted connection from {}", peer);
            let procedures = Arc::clone(&procedures);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(procedures, stream).await {
                    warn!("[RpcServer] Connection from {} ended: {}", peer, e);
                }
            });
        }
    }
}

async fn serve_connection(
    procedures: Arc<HashMap<String, Procedure>>,
    stream: TcpStream,
) -> Result<(), RpcError> {
    let mut framed = Framed::new(stream, frame_codec());

    while let Some(frame) = framed.next().await {
        let request: CallRequest = decode_message(&frame?)?;

        let response = match procedures.get(&request.method) {
            Some(procedure) => match procedure(request.args).await {
                Ok(reply) => CallResponse {
                    seq: request.seq,
                    error: None,
                    reply,
                },
                Err(error) => CallResponse {
                    seq: request.seq,
                    error: Some(error),
                    reply: Vec::new(),
                },
            },
            None => CallResponse {
                seq: request.seq,
                error: Some(format!("rpc: can't find method {}", request.method)),
                reply: Vec::new(),
            },
        };

        framed.send(encode_message(&response)?).await?;
    }

    Ok(())
}
