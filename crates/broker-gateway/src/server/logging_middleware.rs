//! HTTP Request/Response Logging Middleware
//!
//! One entry and one exit line per request, correlated by trace id. Bodies
//! are logged at DEBUG with credential values redacted.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use broker_core::{DecodeError, MAX_ENVELOPE_BYTES};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use tracing::{debug, warn, Instrument};

use crate::handler::Reply;
use crate::logging::{RequestSpan, TraceContext};

/// Maximum body size to log (1MB)
const MAX_BODY_LOG_SIZE: usize = 1024 * 1024;

/// JSON keys whose values never reach the log
const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret"];

/// Headers that should be redacted
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key"];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|k| key.contains(k))
}

/// Replace sensitive values anywhere in a JSON document
pub fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *inner = Value::String("[REDACTED]".to_string());
                } else {
                    redact_json(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

/// Redact sensitive headers (compact format for DEBUG)
fn redact_headers_compact(headers: &axum::http::HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| {
            let n = name.as_str().to_lowercase();
            matches!(
                n.as_str(),
                "content-type" | "accept" | "user-agent" | "origin" | "authorization"
            )
        })
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                format!("{}=[REDACTED]", name)
            } else {
                format!("{}={:?}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format bytes as string - compact version
pub fn format_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "[empty]".to_string();
    }

    if bytes.len() > MAX_BODY_LOG_SIZE {
        return format!("[{} bytes]", bytes.len());
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => {
            if let Ok(mut json) = serde_json::from_str::<Value>(text) {
                redact_json(&mut json);
                return serde_json::to_string(&json).unwrap_or_else(|_| "[json]".to_string());
            }
            // Truncate long text
            match text.char_indices().nth(200) {
                Some((cut, _)) => format!("{}...", &text[..cut]),
                None => text.to_string(),
            }
        }
        Err(_) => format!("[binary: {} bytes]", bytes.len()),
    }
}

/// Pull the action out of a submission body, if there is one
pub fn extract_action(bytes: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(bytes).ok()?;
    json.get("action")
        .and_then(|a| a.as_str())
        .map(String::from)
}

/// Read a request body, never buffering more than the envelope limit
async fn read_request_body(body: Body) -> Result<Bytes, Reply> {
    match Limited::new(body, MAX_ENVELOPE_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(Reply::client_fault(
            DecodeError::TooLarge {
                limit: MAX_ENVELOPE_BYTES,
            }
            .to_string(),
        )),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            Err(Reply::client_fault("failed to read request body"))
        }
    }
}

/// Logging middleware for requests and responses
///
/// Generates a trace_id and logs a single entry/exit line per request.
/// Bodies past the envelope limit are refused here with an error envelope.
pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let headers = request.headers().clone();

    let ctx = TraceContext::new(&method, &path);
    let span = RequestSpan::enter(&ctx);

    async move {
        let (parts, body) = request.into_parts();
        let body_bytes = match read_request_body(body).await {
            Ok(bytes) => bytes,
            Err(reply) => {
                RequestSpan::log_entry(&ctx);
                let detail = reply.envelope.message.as_str();
                RequestSpan::log_exit(&ctx, reply.status, Some(detail));
                return reply.into_response();
            }
        };

        let ctx = ctx.with_action(extract_action(&body_bytes));
        RequestSpan::log_entry(&ctx);

        debug!(
            trace_id = %ctx.trace_id,
            headers = %redact_headers_compact(&headers),
            "Request headers"
        );
        if !body_bytes.is_empty() {
            debug!(
                trace_id = %ctx.trace_id,
                body = %format_body(&body_bytes),
                "Request body"
            );
        }

        let mut request = Request::from_parts(parts, Body::from(body_bytes));
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;

        let (parts, body) = response.into_parts();
        let status = parts.status;

        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, "Failed to read response body: {}", e);
                let reply = Reply::internal_fault("failed to read response body");
                let detail = reply.envelope.message.as_str();
                RequestSpan::log_exit(&ctx, reply.status, Some(detail));
                return reply.into_response();
            }
        };

        // Log response body only if small enough
        if !body_bytes.is_empty() && body_bytes.len() < 1000 {
            debug!(
                trace_id = %ctx.trace_id,
                body = %format_body(&body_bytes),
                "Response body"
            );
        }

        RequestSpan::log_exit(&ctx, status.as_u16(), None);

        Response::from_parts(parts, Body::from(body_bytes))
    }
    .instrument(span)
    .await
}
