//! Circuit breaker integration tests against real transport failures.

use std::{sync::Arc, time::Duration};

use mockito::Server;
use serde_json::json;

use stakescan_rpc::{
	models::{BreakerSettings, DataSource, RpcRequest, SourceKind},
	services::{
		breaker::{BreakerError, CircuitBreakerRegistry, CircuitStatus},
		transport::HttpTransport,
	},
};

use crate::integration::mocks::config::dead_endpoint;

fn transport(url: &str) -> Arc<HttpTransport> {
	let source = DataSource {
		name: "local-daemon".to_string(),
		kind: SourceKind::Primary,
		base_url: url.to_string(),
		credentials: None,
		api_key: None,
		priority: 0,
	};
	Arc::new(HttpTransport::new(&source, Duration::from_millis(500)).unwrap())
}

#[tokio::test]
async fn test_connection_failures_open_the_circuit() {
	let transport = transport(&dead_endpoint());
	let registry = CircuitBreakerRegistry::new(BreakerSettings {
		failure_threshold: 2,
		cooldown_ms: 60_000,
		probe_successes: 1,
	});

	let request = RpcRequest::new("getblockcount", vec![]);
	for _ in 0..2 {
		let outcome = registry
			.execute("local-daemon", || transport.call(&request))
			.await;
		assert!(matches!(outcome, Err(BreakerError::Inner(_))));
	}

	// Threshold reached: the next call is rejected without dialing
	let outcome = registry
		.execute("local-daemon", || transport.call(&request))
		.await;
	assert!(outcome.unwrap_err().is_rejection());

	let snapshot = registry.snapshot("local-daemon").await.unwrap();
	assert_eq!(snapshot.status, CircuitStatus::Open);
	assert_eq!(snapshot.total_failures, 2);
	assert_eq!(snapshot.total_rejections, 1);
}

#[tokio::test]
async fn test_recovered_backend_closes_the_circuit_again() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_body(r#"{"jsonrpc": "2.0", "result": 1, "id": "1"}"#)
		.create_async()
		.await;

	let dead = transport(&dead_endpoint());
	let healthy = transport(&server.url());
	let registry = CircuitBreakerRegistry::new(BreakerSettings {
		failure_threshold: 1,
		cooldown_ms: 30,
		probe_successes: 1,
	});

	let request = RpcRequest::new("getblockcount", vec![]);
	let _ = registry
		.execute("local-daemon", || dead.call(&request))
		.await;
	assert_eq!(
		registry.snapshot("local-daemon").await.unwrap().status,
		CircuitStatus::Open
	);

	// After the cooldown a probe is allowed; its success closes the circuit
	tokio::time::sleep(Duration::from_millis(50)).await;
	let outcome = registry
		.execute("local-daemon", || healthy.call(&request))
		.await;
	assert_eq!(outcome.unwrap().result, Some(json!(1)));
	assert_eq!(
		registry.snapshot("local-daemon").await.unwrap().status,
		CircuitStatus::Closed
	);
}
