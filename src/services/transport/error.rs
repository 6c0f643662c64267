//! Transport error types.
//!
//! Connection-level failures and protocol-level failures are kept apart
//! because they are handled differently upstream: network errors are
//! retried once for idempotent reads, protocol errors never are (a
//! deterministic response is not transient).

use thiserror::Error;

/// Errors produced by a single call against one source.
///
/// Clonable so the batch coalescer can fan one physical failure out to
/// every parked caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
	/// Connection-level failure reaching the source (refused, reset, timeout).
	#[error("Network error calling '{method}': {message}")]
	Network { method: String, message: String },

	/// The source was reachable but answered badly: non-2xx status,
	/// malformed JSON, or a JSON-RPC error object.
	#[error("Protocol error calling '{method}': {message}")]
	Protocol {
		method: String,
		/// HTTP status, when the failure was a non-2xx response.
		status: Option<u16>,
		/// JSON-RPC error code, when the failure was an RPC error object.
		code: Option<i64>,
		message: String,
	},
}

impl TransportError {
	pub fn network(method: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Network {
			method: method.into(),
			message: message.into(),
		}
	}

	pub fn protocol(method: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Protocol {
			method: method.into(),
			status: None,
			code: None,
			message: message.into(),
		}
	}

	pub fn http_status(method: impl Into<String>, status: u16) -> Self {
		Self::Protocol {
			method: method.into(),
			status: Some(status),
			code: None,
			message: format!("unexpected HTTP status {}", status),
		}
	}

	pub fn rpc_error(method: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
		let message = message.into();
		Self::Protocol {
			method: method.into(),
			status: None,
			code: Some(code),
			message: format!("RPC error {}: {}", code, message),
		}
	}

	/// Whether this is a connection-level failure.
	pub fn is_network(&self) -> bool {
		matches!(self, Self::Network { .. })
	}
}
