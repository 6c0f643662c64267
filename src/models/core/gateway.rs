//! Gateway configuration model.
//!
//! One [`GatewayConfig`] describes the RPC access layer for a single network:
//! the primary daemon, the ordered fallback sources, the per-data-class TTL
//! table and the circuit-breaker/transport settings. Loaded once at process
//! start from `config/gateways/<slug>.json` and read-only afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Credentials, DataClass, DataSource, SourceKind};

/// Per-data-class cache TTLs, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TtlTable {
	pub chain_status_secs: u64,
	pub block_secs: u64,
	pub mempool_secs: u64,
	pub address_secs: u64,
	pub identity_secs: u64,
}

impl Default for TtlTable {
	fn default() -> Self {
		Self {
			chain_status_secs: 30,
			block_secs: 300,
			mempool_secs: 10,
			address_secs: 60,
			identity_secs: 300,
		}
	}
}

impl TtlTable {
	/// The TTL for a data class.
	pub fn ttl(&self, class: DataClass) -> Duration {
		let secs = match class {
			DataClass::ChainStatus => self.chain_status_secs,
			DataClass::Block => self.block_secs,
			DataClass::Mempool => self.mempool_secs,
			DataClass::Address => self.address_secs,
			DataClass::Identity => self.identity_secs,
		};
		Duration::from_secs(secs)
	}

	pub fn all(&self) -> [u64; 5] {
		[
			self.chain_status_secs,
			self.block_secs,
			self.mempool_secs,
			self.address_secs,
			self.identity_secs,
		]
	}
}

/// Circuit-breaker thresholds shared by all sources of a gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerSettings {
	/// Consecutive failures before a breaker opens.
	pub failure_threshold: u32,
	/// How long an open breaker rejects calls before probing.
	pub cooldown_ms: u64,
	/// Consecutive probe successes required to close again.
	pub probe_successes: u32,
}

impl Default for BreakerSettings {
	fn default() -> Self {
		Self {
			failure_threshold: 5,
			cooldown_ms: 30_000,
			probe_successes: 2,
		}
	}
}

impl BreakerSettings {
	pub fn cooldown(&self) -> Duration {
		Duration::from_millis(self.cooldown_ms)
	}
}

/// Transport timeout and batch-coalescing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportSettings {
	/// Per-call timeout for every source.
	pub timeout_ms: u64,
	/// How long the coalescer holds a request open for batching.
	pub batch_window_ms: u64,
	/// Maximum number of requests in one physical batch.
	pub max_batch: usize,
}

impl Default for TransportSettings {
	fn default() -> Self {
		Self {
			timeout_ms: 10_000,
			batch_window_ms: 10,
			max_batch: 50,
		}
	}
}

impl TransportSettings {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	pub fn batch_window(&self) -> Duration {
		Duration::from_millis(self.batch_window_ms)
	}
}

/// The primary daemon endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
	#[serde(default = "default_daemon_name")]
	pub name: String,
	pub url: String,
	pub username: String,
	pub password: String,
}

fn default_daemon_name() -> String {
	"local-daemon".to_string()
}

/// One fallback REST source.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSourceConfig {
	pub name: String,
	pub url: String,
	#[serde(default)]
	pub api_key: Option<String>,
	pub priority: u32,
}

/// Full gateway configuration for one network.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
	pub slug: String,
	pub name: String,
	pub daemon: DaemonConfig,
	#[serde(default)]
	pub fallbacks: Vec<FallbackSourceConfig>,
	#[serde(default)]
	pub ttls: TtlTable,
	#[serde(default)]
	pub breaker: BreakerSettings,
	#[serde(default)]
	pub transport: TransportSettings,
}

impl GatewayConfig {
	/// Materializes the ordered source list, primary first, fallbacks by
	/// ascending priority.
	pub fn sources(&self) -> Vec<DataSource> {
		let mut sources = vec![DataSource {
			name: self.daemon.name.clone(),
			kind: SourceKind::Primary,
			base_url: self.daemon.url.clone(),
			credentials: Some(Credentials {
				username: self.daemon.username.clone(),
				password: self.daemon.password.clone(),
			}),
			api_key: None,
			priority: 0,
		}];

		let mut fallbacks: Vec<_> = self.fallbacks.clone();
		fallbacks.sort_by_key(|f| f.priority);
		sources.extend(fallbacks.into_iter().map(|f| DataSource {
			name: f.name,
			kind: SourceKind::Fallback,
			base_url: f.url,
			credentials: None,
			api_key: f.api_key,
			priority: f.priority,
		}));

		sources
	}
}
