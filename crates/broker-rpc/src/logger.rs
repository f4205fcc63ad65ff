//! Logger procedures on the binary call protocol

use serde::{Deserialize, Serialize};

/// Procedure that stores one log entry and returns a confirmation string
pub const LOG_INFO: &str = "RPCServer.LogInfo";

/// Argument of [`LOG_INFO`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcPayload {
    pub name: String,
    pub data: String,
}
