//! Transport layer for daemon JSON-RPC calls.
//!
//! Provides the lowest layer of the access stack:
//! - `HttpTransport`: one JSON-RPC 2.0 call over HTTP with basic auth,
//!   timeout, and a single retry for idempotent reads on connection errors
//! - `BatchCoalescer`: combines concurrent calls into physical batches
//! - `TransportError`: the network/protocol error taxonomy

mod batch;
mod error;
mod http;

pub use batch::BatchCoalescer;
pub use error::TransportError;
pub use http::{HttpTransport, TransientErrorRetryStrategy};
