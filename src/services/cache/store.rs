//! Cache store trait and in-memory implementation.
//!
//! [`CacheStore`] is the seam between the cache service and whatever holds
//! the bytes. The in-memory store keeps entries in a `RwLock<HashMap>` with
//! lazy expiry on read; an externally backed store must handle concurrent
//! access natively.

use std::{
	collections::HashMap,
	time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::cache::CacheError;

/// Key/value store with per-entry TTLs.
///
/// Values are pre-serialized JSON strings; interpreting them is the cache
/// service's concern. Expired entries must behave as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
	/// Returns the unexpired value for `key`, if any.
	async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

	/// Stores `value` under `key` with the given time-to-live.
	async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

	/// Removes `key`. Returns whether an unexpired entry was present.
	async fn delete(&self, key: &str) -> Result<bool, CacheError>;

	/// Removes every key starting with `prefix`. Returns how many
	/// unexpired entries were removed.
	async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

	/// Number of unexpired entries currently stored.
	async fn entry_count(&self) -> Result<u64, CacheError>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
	value: String,
	expires_at: Instant,
}

impl StoredEntry {
	fn is_expired(&self) -> bool {
		Instant::now() >= self.expires_at
	}
}

/// Process-local cache store.
///
/// Expiry is lazy: entries past their deadline are treated as absent on
/// read and physically dropped the next time a write path touches them.
#[derive(Debug, Default)]
pub struct InMemoryStore {
	entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl CacheStore for InMemoryStore {
	async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
		let entries = self.entries.read().await;
		Ok(entries
			.get(key)
			.filter(|entry| !entry.is_expired())
			.map(|entry| entry.value.clone()))
	}

	async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
		let mut entries = self.entries.write().await;
		// Opportunistically drop expired entries while holding the write lock
		entries.retain(|_, entry| !entry.is_expired());
		entries.insert(
			key.to_string(),
			StoredEntry {
				value,
				expires_at: Instant::now() + ttl,
			},
		);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<bool, CacheError> {
		let mut entries = self.entries.write().await;
		Ok(entries
			.remove(key)
			.map(|entry| !entry.is_expired())
			.unwrap_or(false))
	}

	async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
		let mut entries = self.entries.write().await;
		let mut removed = 0;
		entries.retain(|key, entry| {
			if key.starts_with(prefix) {
				if !entry.is_expired() {
					removed += 1;
				}
				false
			} else {
				true
			}
		});
		Ok(removed)
	}

	async fn entry_count(&self) -> Result<u64, CacheError> {
		let entries = self.entries.read().await;
		Ok(entries.values().filter(|entry| !entry.is_expired()).count() as u64)
	}
}
