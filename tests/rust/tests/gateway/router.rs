//! HTTP surface: the router driven with `tower::ServiceExt::oneshot`

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use broker_core::{decode_response, BackendConfig, ResponseEnvelope, MAX_ENVELOPE_BYTES};
use broker_gateway::{GatewayConfig, GatewayServer};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tests::fixtures::{auth_envelope, log_envelope, mail_envelope};
use tests::{test_backends, RecordingLogService};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router(backends: BackendConfig) -> Router {
    let config = GatewayConfig {
        backends,
        ..GatewayConfig::default()
    };
    GatewayServer::new(config).router()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn envelope(response: axum::response::Response) -> ResponseEnvelope {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    decode_response(&bytes).unwrap()
}

#[tokio::test]
async fn test_broker_probe() {
    let response = router(test_backends())
        .oneshot(post("/", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(envelope(response).await, ResponseEnvelope::ok("Hit the broker"));
}

#[tokio::test]
async fn test_ping_and_health() {
    let app = router(test_backends());

    let response = app
        .clone()
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b".");

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_submission_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    let backends = BackendConfig {
        mail_url: format!("{}/send", server.uri()),
        ..test_backends()
    };

    let response = router(backends)
        .oneshot(post("/handle", mail_envelope("a@b.com", "c@d.com", "S", "M")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        envelope(response).await,
        ResponseEnvelope::ok("email sended toc@d.com")
    );
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let backends = BackendConfig {
        auth_url: format!("{}/authenticate", server.uri()),
        ..test_backends()
    };

    let response = router(backends)
        .oneshot(post("/handle", auth_envelope("a@b.com", "x")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        envelope(response).await,
        ResponseEnvelope::error("invalid credentials")
    );
}

#[tokio::test]
async fn test_client_faults() {
    let app = router(test_backends());

    let response = app
        .clone()
        .oneshot(post("/handle", json!({"action": "bogus"}).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(envelope(response).await, ResponseEnvelope::error("unkown action"));

    let response = app
        .clone()
        .oneshot(post("/handle", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(envelope(response).await.error);

    let response = app
        .clone()
        .oneshot(post("/handle", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        envelope(response).await,
        ResponseEnvelope::error("body must not be empty")
    );

    let oversized = vec![b' '; MAX_ENVELOPE_BYTES + 1];
    let response = app.oneshot(post("/handle", oversized)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(envelope(response).await.message.contains("larger than"));
}

#[tokio::test]
async fn test_oversized_body_refused_on_every_route() {
    let app = router(test_backends());

    for uri in ["/", "/handle", "/log-grpc"] {
        let oversized = vec![b'{'; MAX_ENVELOPE_BYTES + 1];
        let response = app.clone().oneshot(post(uri, oversized)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let reply = envelope(response).await;
        assert!(reply.error);
        assert!(reply.message.contains("larger than"));
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let backends = BackendConfig {
        logger_rpc_addr: tests::backends::refused_addr().await.to_string(),
        ..test_backends()
    };

    let response = router(backends)
        .oneshot(post("/handle", log_envelope("event", "hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        envelope(response).await,
        ResponseEnvelope::error("could not reach logger service")
    );
}

#[tokio::test]
async fn test_log_grpc_endpoint() {
    let service = RecordingLogService::answering("");
    let backends = BackendConfig {
        logger_grpc_url: service.clone().spawn().await,
        ..test_backends()
    };

    let response = router(backends)
        .oneshot(post("/log-grpc", log_envelope("event", "hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(envelope(response).await, ResponseEnvelope::ok("logged via gRPC"));
    assert_eq!(service.entries().len(), 1);
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = router(test_backends())
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/handle")
                .header(header::ORIGIN, "http://frontend.local")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
