//! Fallback coordination integration tests with real HTTP sources.

use std::{sync::Arc, time::Duration};

use mockito::Server;
use serde_json::json;

use stakescan_rpc::{
	models::{BreakerSettings, Credentials, DataSource, LogicalCall, SourceKind},
	services::{
		breaker::CircuitBreakerRegistry,
		fallback::{DaemonSource, FallbackCoordinator, RestSource, SourceClient},
		transport::{BatchCoalescer, HttpTransport},
	},
};

use crate::integration::mocks::config::dead_endpoint;

fn daemon_client(url: &str) -> Arc<dyn SourceClient> {
	let source = DataSource {
		name: "local-daemon".to_string(),
		kind: SourceKind::Primary,
		base_url: url.to_string(),
		credentials: Some(Credentials {
			username: "user".to_string(),
			password: "pass".to_string(),
		}),
		api_key: None,
		priority: 0,
	};
	let transport = Arc::new(HttpTransport::new(&source, Duration::from_millis(500)).unwrap());
	let coalescer = Arc::new(BatchCoalescer::new(
		transport.clone(),
		Duration::from_millis(5),
		50,
	));
	Arc::new(DaemonSource::new(source, transport, coalescer))
}

fn rest_client(url: &str, api_key: Option<&str>) -> Arc<dyn SourceClient> {
	let source = DataSource {
		name: "fallback-api".to_string(),
		kind: SourceKind::Fallback,
		base_url: url.to_string(),
		credentials: None,
		api_key: api_key.map(String::from),
		priority: 1,
	};
	Arc::new(RestSource::new(source, Duration::from_millis(500)).unwrap())
}

fn coordinator(sources: Vec<Arc<dyn SourceClient>>) -> FallbackCoordinator {
	FallbackCoordinator::new(
		sources,
		Arc::new(CircuitBreakerRegistry::new(BreakerSettings::default())),
	)
}

#[tokio::test]
async fn test_healthy_daemon_answers_without_touching_the_fallback() {
	let mut daemon = Server::new_async().await;
	daemon
		.mock("POST", "/")
		.with_body_from_request(|request| {
			let body: serde_json::Value =
				serde_json::from_slice(request.body().unwrap()).unwrap();
			serde_json::to_vec(&json!({
				"jsonrpc": "2.0",
				"result": {
					"chain": "main",
					"blocks": 450000,
					"headers": 450000,
					"bestblockhash": "00aa",
					"difficulty": 123.4
				},
				"id": body["id"]
			}))
			.unwrap()
		})
		.create_async()
		.await;

	let mut fallback = Server::new_async().await;
	let fallback_mock = fallback
		.mock("GET", "/api/chain/info")
		.expect(0)
		.create_async()
		.await;

	let coordinator = coordinator(vec![
		daemon_client(&daemon.url()),
		rest_client(&fallback.url(), None),
	]);
	let value = coordinator.resolve(&LogicalCall::ChainInfo).await.unwrap();

	assert_eq!(value["blocks"], json!(450000));
	assert_eq!(value["best_block_hash"], json!("00aa"));
	assert!(!coordinator.is_serving_fallback());
	fallback_mock.assert_async().await;
}

#[tokio::test]
async fn test_dead_daemon_is_served_by_rest_fallback() {
	let mut fallback = Server::new_async().await;
	let mock = fallback
		.mock("GET", "/api/chain/info")
		.with_header("content-type", "application/json")
		.with_body(
			json!({
				"chainName": "VRSC",
				"blockHeight": 450123,
				"bestBlockHash": "00bb",
				"difficulty": "321.5"
			})
			.to_string(),
		)
		.create_async()
		.await;

	let coordinator = coordinator(vec![
		daemon_client(&dead_endpoint()),
		rest_client(&fallback.url(), None),
	]);
	let value = coordinator.resolve(&LogicalCall::ChainInfo).await.unwrap();

	// Same canonical shape as a daemon answer
	assert_eq!(value["chain"], json!("VRSC"));
	assert_eq!(value["blocks"], json!(450123));
	assert_eq!(value["best_block_hash"], json!("00bb"));
	assert_eq!(value["difficulty"], json!(321.5));
	assert!(coordinator.is_serving_fallback());
	mock.assert_async().await;
}

#[tokio::test]
async fn test_fallback_sends_its_api_key() {
	let mut fallback = Server::new_async().await;
	let mock = fallback
		.mock("GET", "/api/mempool/info")
		.match_header("x-api-key", "secret-key")
		.with_body(json!({"size": 12, "bytes": 3400}).to_string())
		.create_async()
		.await;

	let coordinator = coordinator(vec![rest_client(&fallback.url(), Some("secret-key"))]);
	let value = coordinator.resolve(&LogicalCall::MempoolInfo).await.unwrap();

	assert_eq!(value["size"], json!(12));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_enveloped_rest_answers_are_unwrapped() {
	let mut fallback = Server::new_async().await;
	fallback
		.mock("GET", "/api/block-index/42")
		.with_body(json!({"blockHash": "00cc"}).to_string())
		.create_async()
		.await;

	let coordinator = coordinator(vec![rest_client(&fallback.url(), None)]);
	let value = coordinator
		.resolve(&LogicalCall::BlockHash { height: 42 })
		.await
		.unwrap();

	assert_eq!(value, json!("00cc"));
}

#[tokio::test]
async fn test_every_source_down_reports_the_attempt_chain() {
	let coordinator = coordinator(vec![
		daemon_client(&dead_endpoint()),
		rest_client(&dead_endpoint(), None),
	]);

	let error = coordinator
		.resolve(&LogicalCall::ChainInfo)
		.await
		.unwrap_err();
	assert_eq!(
		error.attempted_sources(),
		vec!["local-daemon", "fallback-api"]
	);
}
