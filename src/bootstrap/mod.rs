//! Bootstrap module for initializing the access layer.
//!
//! This module provides functions to load the gateway configurations and
//! wire the gateway pool the rest of the application queries.
//!
//! # Services
//! - `GatewayConfigService`: Loads and validates per-network gateway
//!   configurations
//! - `GatewayPool`: Caches one initialized [`RpcGateway`] per network

use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
	repositories::{GatewayConfigService, GatewayRepository, GatewayRepositoryTrait},
	services::gateway::{GatewayPool, RpcGateway},
};

/// Type alias for handling bootstrap results
pub type Result<T> = anyhow::Result<T>;

/// Initializes the gateway pool from the configured networks.
///
/// # Arguments
/// * `config_path` - Optional directory holding `gateways/*.json`; the
///   default configuration directory is used when `None`
///
/// # Errors
/// Returns an error if configuration loading or validation fails
pub fn initialize_gateway_pool<G: GatewayRepositoryTrait>(
	gateway_service: Option<GatewayConfigService<G>>,
	config_path: Option<&Path>,
) -> Result<Arc<GatewayPool>> {
	let configs = match gateway_service {
		Some(service) => service.get_all(),
		None => GatewayConfigService::<GatewayRepository>::new(config_path)?.get_all(),
	};

	Ok(Arc::new(GatewayPool::new(configs)))
}

/// Initializes a single gateway directly from the configuration of one
/// network. Used by the command-line tools that only touch one network.
pub fn initialize_gateway(
	config_path: Option<&Path>,
	network_slug: &str,
) -> Result<Arc<RpcGateway>> {
	let service = GatewayConfigService::<GatewayRepository>::new(config_path)?;
	let config = service
		.get(network_slug)
		.with_context(|| format!("no gateway configured for network '{}'", network_slug))?;
	Ok(Arc::new(RpcGateway::from_config(config)?))
}
