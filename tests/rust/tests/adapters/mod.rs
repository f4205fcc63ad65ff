//! Adapter integration tests
//!
//! Each adapter against a real loopback backend: wiremock for HTTP, the
//! in-process binary-RPC and structured-RPC loggers for the rest.

mod binary_rpc;
