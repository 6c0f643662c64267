//! Batch coalescer integration tests.
//!
//! The mock daemon echoes request ids back, which is what correlation
//! needs; bodies are inspected to tell batch payloads from plain calls.

use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use mockito::Server;
use serde_json::{json, Value};

use stakescan_rpc::{
	models::{DataSource, RpcRequest, SourceKind},
	services::transport::{BatchCoalescer, HttpTransport},
};

use crate::integration::mocks::config::dead_endpoint;

fn daemon_source(url: &str) -> DataSource {
	DataSource {
		name: "local-daemon".to_string(),
		kind: SourceKind::Primary,
		base_url: url.to_string(),
		credentials: None,
		api_key: None,
		priority: 0,
	}
}

fn coalescer(url: &str, window: Duration) -> Arc<BatchCoalescer> {
	let transport =
		Arc::new(HttpTransport::new(&daemon_source(url), Duration::from_millis(2_000)).unwrap());
	Arc::new(BatchCoalescer::new(transport, window, 50))
}

/// Answers a plain request with `{"result": <echo>, "id": <same>}` and a
/// batch request with one such entry per element, deliberately reversed
/// to exercise reordering.
fn echo_daemon(request: &mockito::Request) -> Vec<u8> {
	let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
	let answer = |entry: &Value| {
		json!({
			"jsonrpc": "2.0",
			"result": entry["params"][0],
			"id": entry["id"]
		})
	};
	let reply = match &body {
		Value::Array(entries) => {
			let mut replies: Vec<Value> = entries.iter().map(answer).collect();
			replies.reverse();
			Value::Array(replies)
		}
		entry => answer(entry),
	};
	serde_json::to_vec(&reply).unwrap()
}

#[tokio::test]
async fn test_concurrent_calls_share_one_physical_request() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_body_from_request(echo_daemon)
		.expect(1)
		.create_async()
		.await;

	let coalescer = coalescer(&server.url(), Duration::from_millis(40));
	let (a, b, c) = tokio::join!(
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(1)])),
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(2)])),
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(3)])),
	);

	// Replies come back in caller order despite the reversed batch
	assert_eq!(a.unwrap().result, Some(json!(1)));
	assert_eq!(b.unwrap().result, Some(json!(2)));
	assert_eq!(c.unwrap().result, Some(json!(3)));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_lone_call_is_posted_as_a_plain_object() {
	let checked = Arc::new(AtomicUsize::new(0));
	let checked_in_mock = checked.clone();

	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_body_from_request(move |request| {
			let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
			assert!(body.is_object(), "lone call must not be wrapped in an array");
			checked_in_mock.fetch_add(1, Ordering::SeqCst);
			echo_daemon(request)
		})
		.expect(1)
		.create_async()
		.await;

	let coalescer = coalescer(&server.url(), Duration::from_millis(10));
	let response = coalescer
		.submit(RpcRequest::new("getblockhash", vec![json!(7)]))
		.await
		.unwrap();

	assert_eq!(response.result, Some(json!(7)));
	assert_eq!(checked.load(Ordering::SeqCst), 1);
	mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_rejection_degrades_to_sequential_dispatch() {
	let mut server = Server::new_async().await;
	// Array payloads are rejected with a lone error object; plain calls
	// are answered normally. 1 failed batch + 2 sequential = 3 requests.
	let mock = server
		.mock("POST", "/")
		.with_body_from_request(|request| {
			let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
			match body {
				Value::Array(_) => serde_json::to_vec(&json!({
					"jsonrpc": "2.0",
					"error": {"code": -32600, "message": "Invalid Request"},
					"id": null
				}))
				.unwrap(),
				_ => echo_daemon(request),
			}
		})
		.expect(3)
		.create_async()
		.await;

	let coalescer = coalescer(&server.url(), Duration::from_millis(40));
	let (a, b) = tokio::join!(
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(1)])),
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(2)])),
	);

	assert_eq!(a.unwrap().result, Some(json!(1)));
	assert_eq!(b.unwrap().result, Some(json!(2)));
	assert!(!coalescer.supports_batching());
	mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_daemon_fails_every_parked_caller() {
	let coalescer = coalescer(&dead_endpoint(), Duration::from_millis(20));
	let (a, b) = tokio::join!(
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(1)])),
		coalescer.submit(RpcRequest::new("getblockhash", vec![json!(2)])),
	);

	assert!(a.unwrap_err().is_network());
	assert!(b.unwrap_err().is_network());
}
