//! Cache error types.
//!
//! [`CacheError`] never escapes the cache service: store failures degrade
//! to a cache miss (reads) or a no-op (writes), because the cache is a
//! performance optimization, not a correctness dependency.

use thiserror::Error;

/// Internal cache failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
	/// The underlying store could not be reached or answered badly.
	#[error("cache store unavailable: {0}")]
	StoreUnavailable(String),

	/// A stored value could not be decoded back into its expected shape.
	#[error("failed to decode cached value for '{key}': {message}")]
	Codec { key: String, message: String },
}

impl CacheError {
	pub fn store_unavailable(msg: impl Into<String>) -> Self {
		Self::StoreUnavailable(msg.into())
	}

	pub fn codec(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Codec {
			key: key.into(),
			message: message.into(),
		}
	}
}
