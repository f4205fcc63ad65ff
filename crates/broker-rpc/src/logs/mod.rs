//! `logs.LogService` structured RPC
//!
//! Messages, client and server generated from `proto/logs.proto`. The server
//! side is used by the logger and by stub loggers in tests.

mod proto {
    tonic::include_proto!("logs");
}

pub use proto::log_service_client;
pub use proto::log_service_server;
pub use proto::{Log, LogRequest, LogResponse};
