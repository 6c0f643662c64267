//! Cache layer.
//!
//! Key/value caching with per-data-class TTLs in front of the fallback
//! coordinator. Repeated logical queries within a TTL window avoid a
//! backend round trip entirely. The store behind the service is pluggable
//! through the [`CacheStore`] trait; failures in it never surface to
//! callers.

mod error;
mod service;
mod store;

pub use error::CacheError;
pub use service::{CacheService, CacheStats};
pub use store::{CacheStore, InMemoryStore};
