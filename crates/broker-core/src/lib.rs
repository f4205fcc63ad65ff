//! # Broker Core Library
//!
//! Protocol-independent types shared by the gateway and its tests.
//!
//! ## Modules
//!
//! - `envelope` - Uniform request/response envelopes and payloads
//! - `action` - Closed set of actions and the typed payload variant
//! - `codec` - JSON envelope codec
//! - `outcome` - Protocol-neutral result of a downstream call
//! - `fault` - Fault taxonomy and HTTP status mapping
//! - `config` - Backend addresses and time bounds

pub mod action;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod fault;
pub mod outcome;

pub use action::{ActionKind, Payload, UnknownAction};
pub use codec::{decode, decode_response, encode, DecodeError, MAX_ENVELOPE_BYTES};
pub use config::{BackendConfig, ConfigError, LogTransport};
pub use envelope::{AuthPayload, LogPayload, MailPayload, RequestEnvelope, ResponseEnvelope};
pub use fault::{Fault, ACCEPTED_STATUS};
pub use outcome::{DownstreamOutcome, OutcomeCode, TransportError};
