use std::{collections::HashSet, path::Path};

use crate::models::{ConfigLoader, GatewayConfig};

use super::error::ConfigError;

impl ConfigLoader for GatewayConfig {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let gateway_dir = path.unwrap_or(Path::new("config/gateways"));
		let mut pairs = Vec::new();

		if !gateway_dir.exists() {
			return Err(ConfigError::file_error("gateways directory not found"));
		}

		for entry in std::fs::read_dir(gateway_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let name = path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();

			if let Ok(gateway) = Self::load_from_path(&path) {
				pairs.push((name, gateway));
			}
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: GatewayConfig = serde_json::from_reader(file)?;

		// Validate the config after loading
		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		// Validate slug
		if self.slug.is_empty()
			|| !self
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(
				"Slug must contain only lowercase letters, numbers, and underscores".to_string(),
			);
		}

		// Validate daemon URL format
		if !self.daemon.url.starts_with("http://") && !self.daemon.url.starts_with("https://") {
			return Err("Daemon URL must start with http:// or https://".to_string());
		}

		if self.daemon.username.is_empty() {
			return Err("Daemon RPC username must not be empty".to_string());
		}

		// Validate fallback URLs and priorities
		let mut priorities = HashSet::new();
		for fallback in &self.fallbacks {
			if !fallback.url.starts_with("http://") && !fallback.url.starts_with("https://") {
				return Err(format!(
					"Fallback source '{}' URL must start with http:// or https://",
					fallback.name
				));
			}

			if fallback.priority == 0 {
				return Err(format!(
					"Fallback source '{}' priority must be greater than 0 (0 is the primary)",
					fallback.name
				));
			}

			if !priorities.insert(fallback.priority) {
				return Err("Fallback source priorities must be unique".to_string());
			}
		}

		// Source names double as circuit-breaker keys
		let mut names: HashSet<&str> = HashSet::new();
		names.insert(self.daemon.name.as_str());
		for fallback in &self.fallbacks {
			if !names.insert(fallback.name.as_str()) {
				return Err("Source names must be unique".to_string());
			}
		}

		// Validate TTL table
		if self.ttls.all().iter().any(|ttl| *ttl == 0) {
			return Err("All TTLs must be greater than 0 seconds".to_string());
		}

		// Validate breaker thresholds
		if self.breaker.failure_threshold == 0 {
			return Err("Breaker failure threshold must be greater than 0".to_string());
		}
		if self.breaker.probe_successes == 0 {
			return Err("Breaker probe success count must be greater than 0".to_string());
		}
		if self.breaker.cooldown_ms == 0 {
			return Err("Breaker cooldown must be greater than 0ms".to_string());
		}

		// Validate transport settings
		if self.transport.timeout_ms < 100 {
			return Err("Transport timeout must be at least 100ms".to_string());
		}
		if self.transport.max_batch == 0 {
			return Err("Max batch size must be greater than 0".to_string());
		}

		Ok(())
	}
}
