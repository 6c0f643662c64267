//! Cache service.
//!
//! Wraps a [`CacheStore`] with the `get_or_compute` contract used by the
//! method façade: on hit the stored value is returned without invoking the
//! compute function; on miss the compute function runs and its result is
//! written through with the caller's TTL. Store failures are absorbed and
//! degrade to the miss path.

use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::cache::CacheStore;

/// Serializable cache counters for the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub store_errors: u64,
	pub invalidations: u64,
	pub entries: u64,
}

/// Cache layer over a pluggable store.
pub struct CacheService<S: CacheStore> {
	store: S,
	hits: AtomicU64,
	misses: AtomicU64,
	store_errors: AtomicU64,
	invalidations: AtomicU64,
}

impl<S: CacheStore> CacheService<S> {
	pub fn new(store: S) -> Self {
		Self {
			store,
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
			store_errors: AtomicU64::new(0),
			invalidations: AtomicU64::new(0),
		}
	}

	/// Returns the cached value for `key`, or computes, stores and returns
	/// a fresh one.
	///
	/// Nothing is cached when `compute` fails; its error propagates
	/// untouched. A failing or corrupt store is treated as a miss so the
	/// caller's request never fails on cache trouble.
	pub async fn get_or_compute<T, E, F, Fut>(
		&self,
		key: &str,
		ttl: Duration,
		compute: F,
	) -> Result<T, E>
	where
		T: Serialize + DeserializeOwned,
		F: FnOnce() -> Fut,
		Fut: std::future::Future<Output = Result<T, E>>,
	{
		match self.store.get(key).await {
			Ok(Some(serialized)) => match serde_json::from_str::<T>(&serialized) {
				Ok(value) => {
					self.hits.fetch_add(1, Ordering::Relaxed);
					debug!(key, "cache hit");
					return Ok(value);
				}
				Err(e) => {
					// Corrupt entry: drop it and fall through to compute
					warn!(key, error = %e, "discarding undecodable cache entry");
					let _ = self.store.delete(key).await;
				}
			},
			Ok(None) => {}
			Err(e) => {
				self.store_errors.fetch_add(1, Ordering::Relaxed);
				warn!(key, error = %e, "cache store read failed, treating as miss");
			}
		}

		self.misses.fetch_add(1, Ordering::Relaxed);
		let value = compute().await?;

		match serde_json::to_string(&value) {
			Ok(serialized) => {
				if let Err(e) = self.store.set(key, serialized, ttl).await {
					self.store_errors.fetch_add(1, Ordering::Relaxed);
					warn!(key, error = %e, "cache store write failed, skipping write-through");
				}
			}
			Err(e) => {
				warn!(key, error = %e, "value not serializable, skipping write-through");
			}
		}

		Ok(value)
	}

	/// Removes one exact key. Returns whether an entry was present; store
	/// failures degrade to `false`.
	pub async fn invalidate(&self, key: &str) -> bool {
		match self.store.delete(key).await {
			Ok(removed) => {
				if removed {
					self.invalidations.fetch_add(1, Ordering::Relaxed);
				}
				removed
			}
			Err(e) => {
				self.store_errors.fetch_add(1, Ordering::Relaxed);
				warn!(key, error = %e, "cache store delete failed");
				false
			}
		}
	}

	/// Removes every key under `prefix` (e.g. after a new-block webhook).
	/// Returns how many entries were removed.
	pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
		match self.store.delete_prefix(prefix).await {
			Ok(removed) => {
				self.invalidations.fetch_add(removed, Ordering::Relaxed);
				removed
			}
			Err(e) => {
				self.store_errors.fetch_add(1, Ordering::Relaxed);
				warn!(prefix, error = %e, "cache store prefix delete failed");
				0
			}
		}
	}

	/// Current counters plus the live entry count.
	pub async fn stats(&self) -> CacheStats {
		let entries = self.store.entry_count().await.unwrap_or(0);
		CacheStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			store_errors: self.store_errors.load(Ordering::Relaxed),
			invalidations: self.invalidations.load(Ordering::Relaxed),
			entries,
		}
	}
}
