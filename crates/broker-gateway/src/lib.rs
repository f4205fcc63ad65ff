//! Broker Gateway
//!
//! Protocol-dispatching broker that:
//! - Accepts one uniform JSON envelope for every action
//! - Resolves the action to a backend route (`dispatch`)
//! - Calls the backend over HTTP, binary RPC or structured RPC (`adapters`)
//! - Folds whatever came back into `{error, message, data}` (`normalize`)
//! - Serves it all over HTTP with per-request trace ids (`server`, `logging`)

pub mod adapters;
pub mod dispatch;
pub mod handler;
pub mod logging;
pub mod normalize;
pub mod server;

pub use adapters::{Adapter, AdapterSet, BinaryRpcAdapter, HttpAdapter, StructuredRpcAdapter};
pub use dispatch::{Dispatcher, Protocol, Route};
pub use handler::{Gateway, Reply, Stage};
pub use normalize::{normalize, Normalized};
pub use server::{GatewayConfig, GatewayServer};
