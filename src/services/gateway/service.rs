//! The RPC gateway façade.
//!
//! One [`RpcGateway`] per configured network. Every typed query follows
//! the same path: build the logical call, consult the cache under the
//! call's key and data-class TTL, and on a miss resolve it through the
//! fallback coordinator. The admin surface (cache stats, source health,
//! breaker snapshots, invalidation) lives here too.

use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::{
	models::{
		AddressBalance, AddressUtxo, Block, ChainInfo, DataClass, GatewayConfig, Identity,
		LogicalCall, MempoolInfo, MiningInfo, NetworkInfo, SourceKind, TransactionSummary,
	},
	services::{
		breaker::{CircuitBreakerRegistry, CircuitBreakerSnapshot},
		cache::{CacheService, CacheStats, InMemoryStore},
		fallback::{DaemonSource, FallbackCoordinator, RestSource, SourceClient, SourceHealth},
		transport::{BatchCoalescer, HttpTransport, TransportError},
	},
};

use super::error::GatewayError;

/// Resilient access to one network's chain data.
pub struct RpcGateway {
	config: GatewayConfig,
	cache: CacheService<InMemoryStore>,
	coordinator: FallbackCoordinator,
	breakers: Arc<CircuitBreakerRegistry>,
}

impl std::fmt::Debug for RpcGateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RpcGateway").finish_non_exhaustive()
	}
}

impl RpcGateway {
	/// Wires the full stack for one network: a batching JSON-RPC transport
	/// for the daemon, a REST client per fallback source, one breaker per
	/// source, and a cache in front of it all.
	pub fn from_config(config: GatewayConfig) -> Result<Self, TransportError> {
		let mut clients: Vec<Arc<dyn SourceClient>> = Vec::new();
		for source in config.sources() {
			match source.kind {
				SourceKind::Primary => {
					let transport =
						Arc::new(HttpTransport::new(&source, config.transport.timeout())?);
					let coalescer = Arc::new(BatchCoalescer::new(
						transport.clone(),
						config.transport.batch_window(),
						config.transport.max_batch,
					));
					clients.push(Arc::new(DaemonSource::new(source, transport, coalescer)));
				}
				SourceKind::Fallback => {
					clients.push(Arc::new(RestSource::new(
						source,
						config.transport.timeout(),
					)?));
				}
			}
		}

		let breakers = Arc::new(CircuitBreakerRegistry::new(config.breaker.clone()));
		let coordinator = FallbackCoordinator::new(clients, breakers.clone());

		info!(
			network = %config.slug,
			sources = config.fallbacks.len() + 1,
			"gateway initialized"
		);

		Ok(Self {
			config,
			cache: CacheService::new(InMemoryStore::new()),
			coordinator,
			breakers,
		})
	}

	pub fn slug(&self) -> &str {
		&self.config.slug
	}

	pub fn name(&self) -> &str {
		&self.config.name
	}

	/// Cache-then-resolve path shared by every typed query.
	async fn fetch<T>(&self, call: LogicalCall) -> Result<T, GatewayError>
	where
		T: Serialize + DeserializeOwned,
	{
		let key = call.cache_key();
		let ttl = self.config.ttls.ttl(call.data_class());
		let value: serde_json::Value = self
			.cache
			.get_or_compute(&key, ttl, || self.coordinator.resolve(&call))
			.await?;
		serde_json::from_value(value).map_err(|e| GatewayError::decode(call.method(), e))
	}

	pub async fn get_chain_info(&self) -> Result<ChainInfo, GatewayError> {
		self.fetch(LogicalCall::ChainInfo).await
	}

	pub async fn get_mining_info(&self) -> Result<MiningInfo, GatewayError> {
		self.fetch(LogicalCall::MiningInfo).await
	}

	pub async fn get_network_info(&self) -> Result<NetworkInfo, GatewayError> {
		self.fetch(LogicalCall::NetworkInfo).await
	}

	pub async fn get_block(&self, hash: &str) -> Result<Block, GatewayError> {
		self.fetch(LogicalCall::Block {
			hash: hash.to_string(),
		})
		.await
	}

	pub async fn get_block_hash(&self, height: u64) -> Result<String, GatewayError> {
		self.fetch(LogicalCall::BlockHash { height }).await
	}

	pub async fn get_block_by_height(&self, height: u64) -> Result<Block, GatewayError> {
		let hash = self.get_block_hash(height).await?;
		self.get_block(&hash).await
	}

	/// Fetches a range of blocks concurrently. The per-height lookups run
	/// in parallel so the batch coalescer can combine their daemon calls.
	pub async fn get_blocks(&self, heights: &[u64]) -> Result<Vec<Block>, GatewayError> {
		let lookups = heights.iter().map(|h| self.get_block_by_height(*h));
		join_all(lookups).await.into_iter().collect()
	}

	pub async fn get_transaction(&self, txid: &str) -> Result<TransactionSummary, GatewayError> {
		self.fetch(LogicalCall::Transaction {
			txid: txid.to_string(),
		})
		.await
	}

	pub async fn get_mempool_info(&self) -> Result<MempoolInfo, GatewayError> {
		self.fetch(LogicalCall::MempoolInfo).await
	}

	pub async fn get_raw_mempool(&self) -> Result<Vec<String>, GatewayError> {
		self.fetch(LogicalCall::RawMempool).await
	}

	pub async fn get_address_balance(&self, address: &str) -> Result<AddressBalance, GatewayError> {
		self.fetch(LogicalCall::AddressBalance {
			address: address.to_string(),
		})
		.await
	}

	pub async fn get_address_utxos(&self, address: &str) -> Result<Vec<AddressUtxo>, GatewayError> {
		self.fetch(LogicalCall::AddressUtxos {
			address: address.to_string(),
		})
		.await
	}

	pub async fn get_identity(&self, name: &str) -> Result<Identity, GatewayError> {
		self.fetch(LogicalCall::Identity {
			name: name.to_string(),
		})
		.await
	}

	/// Primes the hot status entries so the first page load after startup
	/// does not pay backend latency.
	pub async fn warm(&self) {
		let _ = self.get_chain_info().await;
		let _ = self.get_mempool_info().await;
	}

	/// Best-effort background warm. The spawned task never surfaces its
	/// errors; a failed warm just means the next caller pays the miss.
	pub fn spawn_warm(self: &Arc<Self>) {
		let gateway = self.clone();
		tokio::spawn(async move {
			gateway.warm().await;
		});
	}

	// Admin surface

	pub async fn cache_stats(&self) -> CacheStats {
		self.cache.stats().await
	}

	/// Probes every source directly, bypassing cache and breakers.
	pub async fn health_check(&self) -> Vec<SourceHealth> {
		self.coordinator.health_check().await
	}

	/// Whether the most recent query was served by a fallback source.
	pub fn is_serving_fallback(&self) -> bool {
		self.coordinator.is_serving_fallback()
	}

	pub async fn breaker_snapshots(&self) -> Vec<CircuitBreakerSnapshot> {
		self.breakers.snapshot_all().await
	}

	/// Force-closes the breaker for `source`. Returns whether it existed.
	pub async fn reset_breaker(&self, source: &str) -> bool {
		self.breakers.reset(source).await
	}

	pub async fn reset_all_breakers(&self) {
		self.breakers.reset_all().await
	}

	/// Evicts the single cached entry for one logical call, if present.
	pub async fn invalidate_call(&self, call: &LogicalCall) -> bool {
		self.cache.invalidate(&call.cache_key()).await
	}

	/// Drops every cached entry of one data class. Returns the number of
	/// entries removed.
	pub async fn invalidate_class(&self, class: DataClass) -> u64 {
		let prefix = format!("{}:", class.key_prefix());
		self.cache.invalidate_prefix(&prefix).await
	}

	pub async fn invalidate_all(&self) -> u64 {
		self.cache.invalidate_prefix("").await
	}
}
