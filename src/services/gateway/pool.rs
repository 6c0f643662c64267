//! Gateway pool for managing per-network gateways.
//!
//! This module provides a thread-safe pooling system that:
//! - Caches gateways by network slug
//! - Creates gateways lazily on first use
//! - Shares one gateway (and therefore one cache and one set of
//!   breakers) between all callers of the same network
//!
//! The pool uses a fast path for existing gateways and a slow path for
//! creating new ones.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::{models::GatewayConfig, services::transport::TransportError};

use super::service::RpcGateway;

#[derive(Debug, Error)]
pub enum PoolError {
	#[error("no gateway configured for network '{slug}'")]
	UnknownNetwork { slug: String },

	#[error("failed to initialize gateway for network '{slug}': {source}")]
	Initialization {
		slug: String,
		#[source]
		source: TransportError,
	},
}

/// Lazily-initialized gateways indexed by network slug.
pub struct GatewayPool {
	configs: HashMap<String, GatewayConfig>,
	gateways: RwLock<HashMap<String, Arc<RpcGateway>>>,
}

impl GatewayPool {
	pub fn new(configs: HashMap<String, GatewayConfig>) -> Self {
		Self {
			configs,
			gateways: RwLock::new(HashMap::new()),
		}
	}

	/// Slugs of every configured network, sorted.
	pub fn networks(&self) -> Vec<String> {
		let mut slugs: Vec<String> = self.configs.keys().cloned().collect();
		slugs.sort();
		slugs
	}

	/// Returns the gateway for `slug`, creating it on first use.
	pub async fn get(&self, slug: &str) -> Result<Arc<RpcGateway>, PoolError> {
		// Fast path: gateway already exists
		if let Some(gateway) = self.gateways.read().await.get(slug) {
			return Ok(gateway.clone());
		}

		// Slow path: initialize under the write lock, re-checking first
		// so racing callers share one instance
		let mut gateways = self.gateways.write().await;
		if let Some(gateway) = gateways.get(slug) {
			return Ok(gateway.clone());
		}

		let config = self
			.configs
			.get(slug)
			.ok_or_else(|| PoolError::UnknownNetwork {
				slug: slug.to_string(),
			})?;
		let gateway =
			Arc::new(
				RpcGateway::from_config(config.clone()).map_err(|e| PoolError::Initialization {
					slug: slug.to_string(),
					source: e,
				})?,
			);
		gateways.insert(slug.to_string(), gateway.clone());
		Ok(gateway)
	}
}
