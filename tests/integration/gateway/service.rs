//! Gateway integration tests covering the full query path: cache,
//! fallback coordination, breakers and the batching daemon transport.

use std::{sync::Arc, time::Duration};

use mockito::Server;
use serde_json::json;

use stakescan_rpc::{
	models::{DataClass, LogicalCall},
	services::gateway::{GatewayError, RpcGateway},
};

use crate::integration::mocks::config::{dead_endpoint, gateway as gateway_config};

/// Daemon stub that routes on the JSON-RPC method name.
fn verus_daemon(request: &mockito::Request) -> Vec<u8> {
	let body: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
	let answer = |entry: &serde_json::Value| {
		let result = match entry["method"].as_str().unwrap() {
			"getblockhash" => json!(format!("hash-{}", entry["params"][0])),
			"getblock" => json!({
				"hash": entry["params"][0],
				"height": 100,
				"confirmations": 10,
				"time": 1700000000u64,
				"merkleroot": "00dd",
				"tx": ["t1", "t2"],
				"validationtype": "stake"
			}),
			"getblockchaininfo" => json!({
				"chain": "main",
				"blocks": 450000,
				"headers": 450000,
				"bestblockhash": "00aa"
			}),
			other => panic!("unexpected method {}", other),
		};
		json!({"jsonrpc": "2.0", "result": result, "id": entry["id"]})
	};
	let reply = match &body {
		serde_json::Value::Array(entries) => {
			serde_json::Value::Array(entries.iter().map(answer).collect())
		}
		entry => answer(entry),
	};
	serde_json::to_vec(&reply).unwrap()
}

#[tokio::test]
async fn test_repeated_status_queries_hit_the_cache() {
	let mut daemon = Server::new_async().await;
	let mock = daemon
		.mock("POST", "/")
		.with_body_from_request(verus_daemon)
		.expect(1)
		.create_async()
		.await;

	let gateway = RpcGateway::from_config(gateway_config(&daemon.url(), None)).unwrap();

	let first = gateway.get_chain_info().await.unwrap();
	let second = gateway.get_chain_info().await.unwrap();

	assert_eq!(first.blocks, 450000);
	assert_eq!(second.best_block_hash, "00aa");

	let stats = gateway.cache_stats().await;
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.hits, 1);
	mock.assert_async().await;
}

#[tokio::test]
async fn test_block_by_height_resolves_hash_then_block() {
	let mut daemon = Server::new_async().await;
	daemon
		.mock("POST", "/")
		.with_body_from_request(verus_daemon)
		.expect_at_least(2)
		.create_async()
		.await;

	let gateway = RpcGateway::from_config(gateway_config(&daemon.url(), None)).unwrap();
	let block = gateway.get_block_by_height(100).await.unwrap();

	assert_eq!(block.hash, "hash-100");
	assert_eq!(block.height, 100);
	assert_eq!(block.validation_type, "stake");
	assert_eq!(block.tx, vec!["t1".to_string(), "t2".to_string()]);
}

#[tokio::test]
async fn test_daemon_down_page_load_served_by_fallback_then_cache() {
	// An explorer status page load with the daemon down: the first query
	// walks to the fallback API, repeats within the TTL are cache hits,
	// and the daemon breaker has recorded the failure.
	let mut fallback = Server::new_async().await;
	let mock = fallback
		.mock("GET", "/api/chain/info")
		.with_body(
			json!({"chainName": "VRSC", "blockHeight": 450123, "bestBlockHash": "00bb"})
				.to_string(),
		)
		.expect(1)
		.create_async()
		.await;

	let gateway =
		RpcGateway::from_config(gateway_config(&dead_endpoint(), Some(&fallback.url()))).unwrap();

	let first = gateway.get_chain_info().await.unwrap();
	let second = gateway.get_chain_info().await.unwrap();

	assert_eq!(first.blocks, 450123);
	assert_eq!(second.blocks, 450123);
	assert!(gateway.is_serving_fallback());

	let stats = gateway.cache_stats().await;
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.hits, 1);

	let snapshots = gateway.breaker_snapshots().await;
	let daemon_snapshot = snapshots
		.iter()
		.find(|s| s.service == "local-daemon")
		.unwrap();
	assert_eq!(daemon_snapshot.total_failures, 1);

	mock.assert_async().await;
}

#[tokio::test]
async fn test_invalidation_forces_a_refetch() {
	let mut fallback = Server::new_async().await;
	let mock = fallback
		.mock("GET", "/api/chain/info")
		.with_body(json!({"blockHeight": 1}).to_string())
		.expect(2)
		.create_async()
		.await;

	let gateway =
		RpcGateway::from_config(gateway_config(&dead_endpoint(), Some(&fallback.url()))).unwrap();

	gateway.get_chain_info().await.unwrap();
	assert_eq!(gateway.invalidate_class(DataClass::ChainStatus).await, 1);
	gateway.get_chain_info().await.unwrap();

	mock.assert_async().await;
}

#[tokio::test]
async fn test_invalidate_single_entry_leaves_others_cached() {
	let mut fallback = Server::new_async().await;
	let chain = fallback
		.mock("GET", "/api/chain/info")
		.with_body(json!({"blockHeight": 1}).to_string())
		.expect(2)
		.create_async()
		.await;
	let mempool = fallback
		.mock("GET", "/api/mempool/info")
		.with_body(json!({"size": 3}).to_string())
		.expect(1)
		.create_async()
		.await;

	let gateway =
		RpcGateway::from_config(gateway_config(&dead_endpoint(), Some(&fallback.url()))).unwrap();

	gateway.get_chain_info().await.unwrap();
	gateway.get_mempool_info().await.unwrap();

	assert!(gateway.invalidate_call(&LogicalCall::ChainInfo).await);
	gateway.get_chain_info().await.unwrap();
	gateway.get_mempool_info().await.unwrap();

	chain.assert_async().await;
	mempool.assert_async().await;
}

#[tokio::test]
async fn test_background_warm_populates_the_cache() {
	let mut fallback = Server::new_async().await;
	fallback
		.mock("GET", "/api/chain/info")
		.with_body(json!({"blockHeight": 1}).to_string())
		.create_async()
		.await;
	fallback
		.mock("GET", "/api/mempool/info")
		.with_body(json!({"size": 3}).to_string())
		.create_async()
		.await;

	let gateway = Arc::new(
		RpcGateway::from_config(gateway_config(&dead_endpoint(), Some(&fallback.url()))).unwrap(),
	);
	gateway.spawn_warm();

	let mut warmed = false;
	for _ in 0..200 {
		if gateway.cache_stats().await.misses >= 2 {
			warmed = true;
			break;
		}
		tokio::time::sleep(Duration::from_millis(20)).await;
	}
	assert!(warmed, "warm task never populated the cache");

	gateway.get_chain_info().await.unwrap();
	gateway.get_mempool_info().await.unwrap();
	let stats = gateway.cache_stats().await;
	assert_eq!(stats.hits, 2);
}

#[tokio::test]
async fn test_no_reachable_source_is_reported_as_unavailable() {
	let gateway = RpcGateway::from_config(gateway_config(&dead_endpoint(), None)).unwrap();

	let error = gateway.get_chain_info().await.unwrap_err();
	assert!(error.is_unavailable());
	match error {
		GatewayError::Exhausted(exhausted) => {
			assert_eq!(exhausted.attempted_sources(), vec!["local-daemon"]);
		}
		other => panic!("expected exhaustion, got {:?}", other),
	}
}

#[tokio::test]
async fn test_health_check_reports_both_sources() {
	let mut fallback = Server::new_async().await;
	fallback
		.mock("GET", "/api/chain/info")
		.with_body(json!({"blockHeight": 1}).to_string())
		.create_async()
		.await;

	let gateway =
		RpcGateway::from_config(gateway_config(&dead_endpoint(), Some(&fallback.url()))).unwrap();
	let health = gateway.health_check().await;

	assert_eq!(health.len(), 2);
	let daemon = health.iter().find(|h| h.name == "local-daemon").unwrap();
	let api = health.iter().find(|h| h.name == "fallback-api").unwrap();
	assert!(!daemon.healthy);
	assert!(daemon.error.is_some());
	assert!(api.healthy);
}
