//! HTTP handlers for the gateway server

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use broker_core::{encode, DecodeError, ResponseEnvelope, MAX_ENVELOPE_BYTES};
use serde::Serialize;
use tracing::debug;

use crate::handler::{Gateway, Reply};

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        envelope_response(status, self.body())
    }
}

fn envelope_response(status: StatusCode, body: Bytes) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Read the whole request body, refusing anything past the envelope limit
async fn read_body(body: Body) -> Result<Bytes, Reply> {
    to_bytes(body, MAX_ENVELOPE_BYTES).await.map_err(|e| {
        debug!("[Gateway] Rejected request body: {}", e);
        Reply::client_fault(
            DecodeError::TooLarge {
                limit: MAX_ENVELOPE_BYTES,
            }
            .to_string(),
        )
    })
}

/// Probe endpoint: confirms the broker is reachable
pub async fn broker() -> Response {
    debug!("[Gateway] Broker probe");
    envelope_response(StatusCode::OK, encode(&ResponseEnvelope::ok("Hit the broker")))
}

/// Submission endpoint: decode, dispatch, invoke, normalize
pub async fn handle_submission(State(gateway): State<Gateway>, body: Body) -> Reply {
    match read_body(body).await {
        Ok(raw) => gateway.handle(&raw).await,
        Err(reply) => reply,
    }
}

/// Log submission over the structured-RPC route
pub async fn log_grpc(State(gateway): State<Gateway>, body: Body) -> Reply {
    match read_body(body).await {
        Ok(raw) => gateway.handle_structured_log(&raw).await,
        Err(reply) => reply,
    }
}

/// Heartbeat
pub async fn ping() -> &'static str {
    "."
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
