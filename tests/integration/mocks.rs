//! Mock implementations shared by the integration tests.

use std::time::Duration;

use mockall::mock;

use stakescan_rpc::services::cache::{CacheError, CacheStore};

// Mock implementation of the cache store.
// Used for driving the cache service through store failure paths that the
// in-memory store never produces.
mock! {
	pub Store {}

	#[async_trait::async_trait]
	impl CacheStore for Store {
		async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
		async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
		async fn delete(&self, key: &str) -> Result<bool, CacheError>;
		async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
		async fn entry_count(&self) -> Result<u64, CacheError>;
	}
}

/// Builds a gateway configuration pointed at test servers.
pub mod config {
	use stakescan_rpc::models::{
		BreakerSettings, DaemonConfig, FallbackSourceConfig, GatewayConfig, TransportSettings,
		TtlTable,
	};

	pub fn gateway(daemon_url: &str, fallback_url: Option<&str>) -> GatewayConfig {
		GatewayConfig {
			slug: "testnet".to_string(),
			name: "Test Network".to_string(),
			daemon: DaemonConfig {
				name: "local-daemon".to_string(),
				url: daemon_url.to_string(),
				username: "user".to_string(),
				password: "pass".to_string(),
			},
			fallbacks: fallback_url
				.map(|url| {
					vec![FallbackSourceConfig {
						name: "fallback-api".to_string(),
						url: url.to_string(),
						api_key: None,
						priority: 1,
					}]
				})
				.unwrap_or_default(),
			ttls: TtlTable::default(),
			breaker: BreakerSettings::default(),
			transport: TransportSettings {
				timeout_ms: 2_000,
				batch_window_ms: 10,
				max_batch: 50,
			},
		}
	}

	/// A port nothing listens on, for connection-refused scenarios.
	pub fn dead_endpoint() -> String {
		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		drop(listener);
		format!("http://127.0.0.1:{}", port)
	}
}
