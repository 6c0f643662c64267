//! Service layer of the RPC access stack.
//!
//! Layered bottom-up:
//! - `transport`: JSON-RPC over HTTP with batching and a single retry
//! - `breaker`: per-source circuit breakers
//! - `fallback`: priority-ordered source walk with normalization
//! - `cache`: TTL cache in front of the coordinator
//! - `gateway`: the typed façade callers use

pub mod breaker;
pub mod cache;
pub mod fallback;
pub mod gateway;
pub mod transport;
