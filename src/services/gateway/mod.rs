//! Gateway façade.
//!
//! The typed entry point the rest of the application calls: one
//! [`RpcGateway`] per network wiring cache, fallback coordination,
//! circuit breakers and the batching transport together, plus a
//! [`GatewayPool`] that caches gateways by network slug.

mod error;
mod pool;
mod service;

pub use error::GatewayError;
pub use pool::{GatewayPool, PoolError};
pub use service::RpcGateway;
