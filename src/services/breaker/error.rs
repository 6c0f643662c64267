//! Circuit breaker error types.

use std::time::Duration;

use thiserror::Error;

/// A call was rejected because the service's breaker is open and its
/// cooldown has not elapsed. No underlying call was made.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("circuit for '{service}' is open, next probe allowed in {}ms", cooldown_remaining.as_millis())]
pub struct CircuitOpenError {
	pub service: String,
	pub cooldown_remaining: Duration,
}

/// Outcome of a guarded call: either the breaker rejected it, or the
/// underlying operation ran and failed with its own error.
#[derive(Debug, Error)]
pub enum BreakerError<E: std::error::Error + 'static> {
	#[error(transparent)]
	Open(#[from] CircuitOpenError),

	#[error(transparent)]
	Inner(E),
}

impl<E: std::error::Error + 'static> BreakerError<E> {
	/// Whether the call was rejected without reaching the backend.
	pub fn is_rejection(&self) -> bool {
		matches!(self, Self::Open(_))
	}
}
