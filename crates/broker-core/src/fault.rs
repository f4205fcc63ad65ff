//! Fault taxonomy
//!
//! Every failed request is classified into one of these before the reply is
//! written. The class decides the HTTP status; the envelope carries the text.

use std::fmt;

/// Why a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Malformed envelope or unknown action. Never retried.
    ClientFault,
    /// The backend rejected the caller's credentials
    UpstreamUnauthorized,
    /// Backend unreachable, timed out, failed, or answered garbage
    UpstreamUnavailable,
    /// Broken invariant inside the broker; fatal to the request only
    InternalFault,
}

impl Fault {
    /// HTTP status used for the reply
    pub fn status_code(&self) -> u16 {
        match self {
            Fault::ClientFault => 400,
            Fault::UpstreamUnauthorized => 401,
            Fault::UpstreamUnavailable => 502,
            Fault::InternalFault => 500,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fault::ClientFault => "client_fault",
            Fault::UpstreamUnauthorized => "upstream_unauthorized",
            Fault::UpstreamUnavailable => "upstream_unavailable",
            Fault::InternalFault => "internal_fault",
        };
        f.write_str(name)
    }
}

/// HTTP status for a successful submission
pub const ACCEPTED_STATUS: u16 = 202;
