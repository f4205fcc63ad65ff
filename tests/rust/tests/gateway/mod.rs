//! Gateway integration tests
//!
//! Full submissions through the handler and the HTTP router, with every
//! backend stubbed on loopback.

mod router;
