//! Gateway error types.

use thiserror::Error;

use crate::services::fallback::{AllSourcesExhaustedError, SourceError};
use crate::services::transport::TransportError;

/// Result of a gateway query that could not be answered.
///
/// Source failures pass through untranslated so callers keep the full
/// attempt chain; [`Decode`](GatewayError::Decode) only fires when a
/// normalized payload does not fit its canonical record, which indicates
/// a projection bug rather than a backend problem.
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error(transparent)]
	Exhausted(#[from] AllSourcesExhaustedError),

	#[error("failed to decode normalized '{method}' payload: {message}")]
	Decode { method: String, message: String },
}

impl GatewayError {
	pub fn decode(method: &str, error: serde_json::Error) -> Self {
		Self::Decode {
			method: method.to_string(),
			message: error.to_string(),
		}
	}

	/// Whether the failure means no backend could be reached at all, as
	/// opposed to backends answering with errors.
	pub fn is_unavailable(&self) -> bool {
		match self {
			Self::Exhausted(exhausted) => {
				!exhausted.attempts.is_empty()
					&& exhausted.attempts.iter().all(|attempt| match &attempt.error {
						SourceError::CircuitOpen(_) => true,
						SourceError::Transport(TransportError::Network { .. }) => true,
						SourceError::Transport(TransportError::Protocol { .. }) => false,
					})
			}
			Self::Decode { .. } => false,
		}
	}
}
