//! Broker RPC
//!
//! Outbound protocols the gateway speaks besides plain HTTP:
//! - `call` - length-prefixed binary call protocol (client and server)
//! - `logs` - the logger's `logs.LogService` structured RPC (client and server)
//! - `logger` - procedure names and argument types the logger exposes

pub mod call;
pub mod logger;
pub mod logs;

pub use call::{RpcClient, RpcError, RpcServer};
pub use logger::{RpcPayload, LOG_INFO};
pub use logs::log_service_client::LogServiceClient;
pub use logs::log_service_server::{LogService, LogServiceServer};
