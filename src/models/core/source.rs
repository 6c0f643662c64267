//! Data source descriptors.
//!
//! A [`DataSource`] describes one backend the fallback coordinator may query:
//! either the primary daemon (JSON-RPC) or a read-only fallback API (REST).
//! The list is static configuration, read-only at runtime; ordering by
//! ascending priority is significant.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Whether a source is the primary daemon or a read-only fallback API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
	Primary,
	Fallback,
}

/// HTTP basic-auth credentials for the daemon endpoint.
///
/// Wiped from memory on drop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

/// A single configured data source.
#[derive(Debug, Clone)]
pub struct DataSource {
	/// Service name, also the circuit-breaker key (e.g. "local-daemon").
	pub name: String,
	pub kind: SourceKind,
	pub base_url: String,
	/// Basic-auth credentials; only the daemon requires them.
	pub credentials: Option<Credentials>,
	/// Optional API key sent as `X-API-Key` to fallback REST sources.
	pub api_key: Option<String>,
	/// Sources are attempted in ascending priority order.
	pub priority: u32,
}

impl DataSource {
	pub fn is_primary(&self) -> bool {
		self.kind == SourceKind::Primary
	}
}
