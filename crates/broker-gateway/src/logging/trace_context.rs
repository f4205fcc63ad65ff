//! Trace Context - Request correlation and structured logging
//!
//! Generates short trace IDs and the span every request is logged under.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{info, info_span, Span};

/// Global request counter for trace ID generation
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a short, unique trace ID for this request
/// Format: 6 hex characters (e.g., "a1b2c3")
pub fn generate_trace_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    // Mix counter and timestamp for uniqueness
    let mixed = counter.wrapping_add(timestamp);
    format!("{:06x}", mixed & 0xFFFFFF)
}

/// Correlation data for a single inbound request
#[derive(Debug, Clone)]
pub struct TraceContext {
    /// Unique trace ID (6 hex chars)
    pub trace_id: String,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path (e.g., /handle)
    pub path: String,
    /// Envelope action, when the body carried one
    pub action: Option<String>,
    /// Request start time
    pub started_at: Instant,
}

impl TraceContext {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            trace_id: generate_trace_id(),
            method: method.to_string(),
            path: path.to_string(),
            action: None,
            started_at: Instant::now(),
        }
    }

    /// Set the envelope action (parsed from the body)
    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action;
        self
    }

    /// Get elapsed time since request started
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// Action for logging (at most 16 chars, "-" when absent)
    pub fn short_action(&self) -> &str {
        match self.action.as_deref() {
            Some(action) => match action.char_indices().nth(16) {
                Some((cut, _)) => &action[..cut],
                None => action,
            },
            None => "-",
        }
    }
}

/// Request span builder for structured logging
pub struct RequestSpan;

impl RequestSpan {
    /// Create a tracing span for an incoming request
    ///
    /// This span will automatically include trace_id in all child logs.
    pub fn enter(ctx: &TraceContext) -> Span {
        info_span!(
            "request",
            trace_id = %ctx.trace_id,
            method = %ctx.method,
            path = %ctx.path,
        )
    }

    /// Log request entry (single consolidated line)
    pub fn log_entry(ctx: &TraceContext) {
        if ctx.action.is_some() {
            info!(
                trace_id = %ctx.trace_id,
                "→ {} {} action={}",
                ctx.method,
                ctx.path,
                ctx.short_action()
            );
        } else {
            info!(trace_id = %ctx.trace_id, "→ {} {}", ctx.method, ctx.path);
        }
    }

    /// Log request completion (single consolidated line)
    pub fn log_exit(ctx: &TraceContext, status: u16, detail: Option<&str>) {
        let elapsed = ctx.elapsed_ms();

        match detail {
            Some(d) => info!(
                trace_id = %ctx.trace_id,
                "← {} {} ({}ms)",
                status,
                d,
                elapsed
            ),
            None => info!(trace_id = %ctx.trace_id, "← {} ({}ms)", status, elapsed),
        }
    }
}
