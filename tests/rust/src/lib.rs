//! Shared test utilities and fixtures for broker integration tests.

use std::time::Duration;

use broker_core::BackendConfig;

/// Stub backends listening on loopback
pub mod backends;
pub use backends::{RecordingLogService, RpcLoggerStub};

/// Request envelopes used across tests
pub mod fixtures {
    use serde_json::json;

    pub fn auth_envelope(email: &str, password: &str) -> Vec<u8> {
        json!({"action": "auth", "auth": {"email": email, "password": password}})
            .to_string()
            .into_bytes()
    }

    pub fn log_envelope(name: &str, data: &str) -> Vec<u8> {
        json!({"action": "log", "log": {"name": name, "data": data}})
            .to_string()
            .into_bytes()
    }

    pub fn mail_envelope(from: &str, to: &str, subject: &str, message: &str) -> Vec<u8> {
        json!({
            "action": "mail",
            "mail": {"from": from, "to": to, "subject": subject, "message": message}
        })
        .to_string()
        .into_bytes()
    }
}

/// Backend configuration with short time bounds, pointing nowhere useful
/// until a test overrides the addresses it needs.
pub fn test_backends() -> BackendConfig {
    BackendConfig {
        http_timeout: Duration::from_secs(2),
        rpc_timeout: Duration::from_secs(2),
        grpc_deadline: Duration::from_millis(500),
        ..BackendConfig::default()
    }
}

/// Install a test subscriber once; honours RUST_LOG
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
