//! Resilient RPC access layer for proof-of-stake chain explorers.
//!
//! Sits between an explorer application and its chain data backends: a
//! local daemon spoken to over JSON-RPC plus explorer-style REST APIs as
//! fallbacks. Every query goes through a cache with per-data-class TTLs,
//! a fallback coordinator that walks sources in priority order, circuit
//! breakers that shield persistently failing backends, and a transport
//! that batches concurrent daemon calls.
//!
//! # Layout
//! - `models`: wire types, logical calls, canonical records, configuration
//! - `repositories`: configuration loading keyed by network slug
//! - `services`: transport, breaker, fallback, cache and gateway layers
//! - `bootstrap`: wiring helpers for binaries
//! - `utils`: HTTP client construction and logging

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
