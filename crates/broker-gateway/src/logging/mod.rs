//! Request correlation for the gateway's logs
//!
//! - Trace IDs for request correlation
//! - One `request` span per inbound call
//! - Consolidated entry/exit lines

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
