//! Gateway configuration repository.
//!
//! Loads the per-network gateway configurations from `config/gateways/`
//! and exposes them to the rest of the application, keyed by network
//! slug.

use std::{collections::HashMap, path::Path};

use crate::{
	models::{ConfigLoader, GatewayConfig},
	repositories::error::RepositoryError,
};

pub struct GatewayRepository {
	pub gateways: HashMap<String, GatewayConfig>,
}

impl GatewayRepository {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let gateways = GatewayConfig::load_all(path)
			.map_err(|e| RepositoryError::load_error(format!("Failed to load gateways: {}", e)))?;
		Ok(GatewayRepository { gateways })
	}
}

pub trait GatewayRepositoryTrait {
	fn load_all(&self, path: Option<&Path>)
		-> Result<HashMap<String, GatewayConfig>, RepositoryError>;
	fn get(&self, network_slug: &str) -> Option<GatewayConfig>;
	fn get_all(&self) -> HashMap<String, GatewayConfig>;
}

impl GatewayRepositoryTrait for GatewayRepository {
	fn load_all(
		&self,
		path: Option<&Path>,
	) -> Result<HashMap<String, GatewayConfig>, RepositoryError> {
		GatewayConfig::load_all(path)
			.map_err(|e| RepositoryError::load_error(format!("Failed to load gateways: {}", e)))
	}

	fn get(&self, network_slug: &str) -> Option<GatewayConfig> {
		self.gateways.get(network_slug).cloned()
	}

	fn get_all(&self) -> HashMap<String, GatewayConfig> {
		self.gateways.clone()
	}
}

pub struct GatewayConfigService<T: GatewayRepositoryTrait> {
	repository: T,
}

impl<T: GatewayRepositoryTrait> GatewayConfigService<T> {
	pub fn new(
		path: Option<&Path>,
	) -> Result<GatewayConfigService<GatewayRepository>, RepositoryError> {
		let repository = GatewayRepository::new(path)?;
		Ok(GatewayConfigService { repository })
	}

	pub fn new_with_repository(repository: T) -> Result<Self, RepositoryError> {
		Ok(GatewayConfigService { repository })
	}

	pub fn get(&self, network_slug: &str) -> Option<GatewayConfig> {
		self.repository.get(network_slug)
	}

	pub fn get_all(&self) -> HashMap<String, GatewayConfig> {
		self.repository.get_all()
	}
}
