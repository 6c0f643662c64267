//! Gateway configuration repository tests over real config directories.

use std::fs;

use tempfile::TempDir;

use stakescan_rpc::repositories::{GatewayRepository, GatewayRepositoryTrait};

fn write_config(dir: &TempDir, file: &str, body: &str) {
	fs::write(dir.path().join(file), body).unwrap();
}

fn valid_config(slug: &str) -> String {
	format!(
		r#"{{
			"slug": "{}",
			"name": "Test Network",
			"daemon": {{
				"url": "http://127.0.0.1:27486",
				"username": "user",
				"password": "pass"
			}},
			"fallbacks": [
				{{"name": "explorer-api", "url": "https://api.example.org", "priority": 1}}
			]
		}}"#,
		slug
	)
}

#[test]
fn test_loads_configs_keyed_by_file_stem() {
	let dir = TempDir::new().unwrap();
	write_config(&dir, "vrsc.json", &valid_config("vrsc"));
	write_config(&dir, "notes.txt", "not a config");

	let repository = GatewayRepository::new(Some(dir.path())).unwrap();
	assert_eq!(repository.gateways.len(), 1);

	let config = repository.get("vrsc").unwrap();
	assert_eq!(config.slug, "vrsc");
	assert_eq!(config.fallbacks.len(), 1);
	// Unconfigured sections fall back to their defaults
	assert_eq!(config.breaker.failure_threshold, 5);
	assert_eq!(config.ttls.chain_status_secs, 30);
}

#[test]
fn test_invalid_configs_are_skipped() {
	let dir = TempDir::new().unwrap();
	write_config(&dir, "good.json", &valid_config("good"));
	// Uppercase slug fails validation
	write_config(&dir, "bad.json", &valid_config("BAD"));

	let repository = GatewayRepository::new(Some(dir.path())).unwrap();
	assert!(repository.get("good").is_some());
	assert!(repository.get("bad").is_none());
}

#[test]
fn test_missing_directory_is_an_error() {
	let dir = TempDir::new().unwrap();
	let missing = dir.path().join("does-not-exist");
	assert!(GatewayRepository::new(Some(&missing)).is_err());
}

#[test]
fn test_sources_order_primary_then_priority() {
	let dir = TempDir::new().unwrap();
	write_config(
		&dir,
		"multi.json",
		r#"{
			"slug": "multi",
			"name": "Multi Source",
			"daemon": {
				"url": "http://127.0.0.1:27486",
				"username": "user",
				"password": "pass"
			},
			"fallbacks": [
				{"name": "second", "url": "https://b.example.org", "priority": 2},
				{"name": "first", "url": "https://a.example.org", "priority": 1}
			]
		}"#,
	);

	let repository = GatewayRepository::new(Some(dir.path())).unwrap();
	let sources = repository.get("multi").unwrap().sources();
	let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
	assert_eq!(names, vec!["local-daemon", "first", "second"]);
}
