//! BinaryRpcAdapter against the in-process binary-RPC logger

use std::time::Duration;

use broker_core::{
    ActionKind, BackendConfig, LogPayload, MailPayload, OutcomeCode, Payload, TransportError,
};
use broker_gateway::{Adapter, BinaryRpcAdapter, Dispatcher, Route};
use broker_rpc::RpcPayload;
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::backends::{refused_addr, spawn_silent_listener};
use tests::RpcLoggerStub;

fn log_route(addr: impl ToString) -> Route {
    let config = BackendConfig {
        logger_rpc_addr: addr.to_string(),
        ..BackendConfig::default()
    };
    Dispatcher::new(&config).route(ActionKind::Log).clone()
}

fn entry() -> Payload {
    Payload::Log(LogPayload {
        name: "event".into(),
        data: "hello".into(),
    })
}

#[tokio::test]
async fn test_log_info_round_trip() {
    let logger = RpcLoggerStub::spawn().await;
    let adapter = BinaryRpcAdapter::new(Duration::from_secs(2));

    let outcome = adapter.invoke(&log_route(logger.addr), &entry()).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.code, OutcomeCode::Call);
    assert_eq!(outcome.body, Some(json!("Processed payload via RPC: event")));
    assert_eq!(
        logger.entries(),
        vec![RpcPayload {
            name: "event".into(),
            data: "hello".into(),
        }]
    );
}

#[tokio::test]
async fn test_each_call_uses_its_own_connection() {
    let logger = RpcLoggerStub::spawn().await;
    let adapter = BinaryRpcAdapter::new(Duration::from_secs(2));
    let route = log_route(logger.addr);

    for _ in 0..3 {
        assert!(adapter.invoke(&route, &entry()).await.succeeded);
    }
    assert_eq!(logger.entries().len(), 3);
}

#[tokio::test]
async fn test_procedure_error_is_transport_error() {
    let logger = RpcLoggerStub::spawn_failing("disk full").await;
    let adapter = BinaryRpcAdapter::new(Duration::from_secs(2));

    let outcome = adapter.invoke(&log_route(logger.addr), &entry()).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.code, OutcomeCode::Call);
    assert_eq!(
        outcome.transport_error,
        Some(TransportError::Remote("disk full".into()))
    );
}

#[tokio::test]
async fn test_unreachable_logger() {
    let adapter = BinaryRpcAdapter::new(Duration::from_secs(2));

    let outcome = adapter.invoke(&log_route(refused_addr().await), &entry()).await;

    assert_eq!(outcome.code, OutcomeCode::NoReply);
    assert!(matches!(outcome.transport_error, Some(TransportError::Connect(_))));
}

#[tokio::test]
async fn test_silent_logger_times_out() {
    let addr = spawn_silent_listener().await;
    let adapter = BinaryRpcAdapter::new(Duration::from_millis(200));

    let outcome = adapter.invoke(&log_route(addr), &entry()).await;

    assert_eq!(outcome.transport_error, Some(TransportError::Timeout(200)));
}

#[tokio::test]
async fn test_non_log_payload_is_unsupported() {
    let logger = RpcLoggerStub::spawn().await;
    let adapter = BinaryRpcAdapter::new(Duration::from_secs(2));
    let mail = Payload::Mail(MailPayload::default());

    let outcome = adapter.invoke(&log_route(logger.addr), &mail).await;

    assert!(matches!(
        outcome.transport_error,
        Some(TransportError::Unsupported { .. })
    ));
    assert!(logger.entries().is_empty());
}
