//! `logs.LogService` between the generated-style client and server

use broker_rpc::logs::{Log, LogRequest};
use broker_rpc::LogServiceClient;
use pretty_assertions::assert_eq;
use tests::RecordingLogService;
use tonic::transport::Endpoint;

#[tokio::test]
async fn test_write_log_round_trip() {
    let service = RecordingLogService::answering("logged");
    let url = service.clone().spawn().await;

    let channel = Endpoint::from_shared(url).unwrap().connect().await.unwrap();
    let mut client = LogServiceClient::new(channel);

    let response = client
        .write_log(LogRequest {
            log_entry: Some(Log {
                name: "event".into(),
                data: "hello".into(),
            }),
        })
        .await
        .unwrap();

    assert_eq!(response.into_inner().result, "logged");
    assert_eq!(service.entries(), vec![("event".to_string(), "hello".to_string())]);
}

#[tokio::test]
async fn test_missing_entry_is_rejected() {
    let service = RecordingLogService::answering("logged");
    let url = service.clone().spawn().await;

    let channel = Endpoint::from_shared(url).unwrap().connect().await.unwrap();
    let mut client = LogServiceClient::new(channel);

    let status = client
        .write_log(LogRequest { log_entry: None })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::InvalidArgument);
    assert!(service.entries().is_empty());
}
