//! Fallback coordination error types.

use std::fmt;

use thiserror::Error;

use crate::services::{breaker::CircuitOpenError, transport::TransportError};

/// Why one source failed to answer a logical call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
	/// The source was skipped because its breaker is open.
	#[error(transparent)]
	CircuitOpen(#[from] CircuitOpenError),

	/// The source was called and failed.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// One failed attempt in the fallback walk.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAttempt {
	pub source: String,
	pub error: SourceError,
}

/// Every configured source failed or was skipped.
///
/// Carries the full attempt chain for diagnostics; the last error is the
/// most proximate cause surfaced to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct AllSourcesExhaustedError {
	pub attempts: Vec<SourceAttempt>,
}

impl AllSourcesExhaustedError {
	pub fn new(attempts: Vec<SourceAttempt>) -> Self {
		Self { attempts }
	}

	/// Names of every source attempted, in the order they were tried.
	pub fn attempted_sources(&self) -> Vec<&str> {
		self.attempts.iter().map(|a| a.source.as_str()).collect()
	}

	/// The error from the last attempted source, if any source existed.
	pub fn last_error(&self) -> Option<&SourceError> {
		self.attempts.last().map(|a| &a.error)
	}
}

impl fmt::Display for AllSourcesExhaustedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names: Vec<&str> = self.attempted_sources();
		match self.last_error() {
			Some(error) => write!(
				f,
				"all sources exhausted after attempting [{}]: {}",
				names.join(", "),
				error
			),
			None => write!(f, "no sources configured"),
		}
	}
}

impl std::error::Error for AllSourcesExhaustedError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.last_error()
			.map(|e| e as &(dyn std::error::Error + 'static))
	}
}
