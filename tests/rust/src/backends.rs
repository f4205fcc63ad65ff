//! Stub loggers for the binary-RPC and structured-RPC routes, plus
//! listeners that never answer.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use broker_rpc::logs::{LogRequest, LogResponse};
use broker_rpc::{LogService, LogServiceServer, RpcPayload, RpcServer, LOG_INFO};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

/// Binary-RPC logger that records every entry it is sent
pub struct RpcLoggerStub {
    pub addr: SocketAddr,
    entries: Arc<Mutex<Vec<RpcPayload>>>,
}

impl RpcLoggerStub {
    /// Logger answering `Processed payload via RPC: <name>`
    pub async fn spawn() -> Self {
        Self::spawn_with(|entry| Ok(format!("Processed payload via RPC: {}", entry.name))).await
    }

    /// Logger whose every call fails with `message`
    pub async fn spawn_failing(message: &'static str) -> Self {
        Self::spawn_with(move |_| Err(message.to_string())).await
    }

    async fn spawn_with<F>(reply: F) -> Self
    where
        F: Fn(&RpcPayload) -> Result<String, String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let entries = Arc::new(Mutex::new(Vec::new()));

        let recorded = entries.clone();
        let reply = Arc::new(reply);
        let server = RpcServer::new().register(LOG_INFO, move |entry: RpcPayload| {
            let recorded = recorded.clone();
            let reply = reply.clone();
            async move {
                let result = reply(&entry);
                recorded.lock().unwrap().push(entry);
                result
            }
        });
        tokio::spawn(server.serve(listener));

        Self { addr, entries }
    }

    pub fn entries(&self) -> Vec<RpcPayload> {
        self.entries.lock().unwrap().clone()
    }
}

/// Structured-RPC logger that records entries and answers with a fixed result
#[derive(Clone, Default)]
pub struct RecordingLogService {
    pub result: String,
    pub delay: Option<Duration>,
    /// Answer every call with `Status::internal` carrying this message
    pub failure: Option<String>,
    pub entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingLogService {
    pub fn answering(result: &str) -> Self {
        Self {
            result: result.to_string(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Sleep this long before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Serve on a loopback port; returns the `http://` URL to dial
    pub async fn spawn(self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(
            tonic::transport::Server::builder()
                .add_service(LogServiceServer::new(self))
                .serve_with_incoming(TcpListenerStream::new(listener)),
        );
        format!("http://{}", addr)
    }
}

#[tonic::async_trait]
impl LogService for RecordingLogService {
    async fn write_log(
        &self,
        request: tonic::Request<LogRequest>,
    ) -> Result<tonic::Response<LogResponse>, tonic::Status> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(tonic::Status::internal(message.clone()));
        }
        let entry = request
            .into_inner()
            .log_entry
            .ok_or_else(|| tonic::Status::invalid_argument("missing log entry"))?;
        self.entries.lock().unwrap().push((entry.name, entry.data));
        Ok(tonic::Response::new(LogResponse {
            result: self.result.clone(),
        }))
    }
}

/// Accepts connections and never writes a byte back
pub async fn spawn_silent_listener() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// A loopback address nothing is listening on
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
