//! Source clients.
//!
//! [`SourceClient`] is the seam the fallback coordinator walks: one
//! implementation speaks JSON-RPC to the primary daemon through the batch
//! coalescer, the other speaks REST to explorer-style fallback APIs. Both
//! return the raw JSON payload for a logical call; projecting it into the
//! canonical shape happens in the coordinator.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use url::Url;

use crate::{
	models::{DataSource, LogicalCall, RpcRequest, SourceKind},
	services::transport::{
		BatchCoalescer, HttpTransport, TransientErrorRetryStrategy, TransportError,
	},
	utils::{create_retryable_http_client, HttpRetryConfig},
};

/// Short timeout for health-check probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// One backend capable of answering logical calls.
#[async_trait]
pub trait SourceClient: Send + Sync {
	/// Service name, also the circuit-breaker key.
	fn name(&self) -> &str;

	fn kind(&self) -> SourceKind;

	/// Answers `call` with the source's raw, un-normalized JSON payload.
	async fn execute(&self, call: &LogicalCall) -> Result<Value, TransportError>;

	/// Lightweight availability probe, independent of the breaker.
	async fn probe(&self) -> Result<(), TransportError>;
}

/// The primary daemon, spoken to over JSON-RPC through the coalescer.
pub struct DaemonSource {
	source: DataSource,
	transport: Arc<HttpTransport>,
	coalescer: Arc<BatchCoalescer>,
}

impl DaemonSource {
	pub fn new(
		source: DataSource,
		transport: Arc<HttpTransport>,
		coalescer: Arc<BatchCoalescer>,
	) -> Self {
		Self {
			source,
			transport,
			coalescer,
		}
	}
}

#[async_trait]
impl SourceClient for DaemonSource {
	fn name(&self) -> &str {
		&self.source.name
	}

	fn kind(&self) -> SourceKind {
		self.source.kind
	}

	async fn execute(&self, call: &LogicalCall) -> Result<Value, TransportError> {
		let request = RpcRequest::new(call.method(), call.params());
		let response = self.coalescer.submit(request).await?;
		if let Some(error) = &response.error {
			return Err(TransportError::rpc_error(
				call.method(),
				error.code,
				&error.message,
			));
		}
		Ok(response.result.unwrap_or(Value::Null))
	}

	async fn probe(&self) -> Result<(), TransportError> {
		let request = RpcRequest::new("getblockcount", vec![]);
		self.transport
			.call_with_timeout(&request, PROBE_TIMEOUT)
			.await
			.map(|_| ())
	}
}

/// A read-only fallback REST API.
///
/// Paths follow the explorer-API convention; identifiers are URL-encoded.
/// Single-key `data`/`result` envelopes are unwrapped so the coordinator
/// always sees the payload itself.
pub struct RestSource {
	source: DataSource,
	base_url: Url,
	client: ClientWithMiddleware,
	timeout: Duration,
}

impl RestSource {
	pub fn new(source: DataSource, timeout: Duration) -> Result<Self, TransportError> {
		// A trailing slash keeps Url::join from eating the last path segment
		let mut base = source.base_url.clone();
		if !base.ends_with('/') {
			base.push('/');
		}
		let base_url = Url::parse(&base).map_err(|e| {
			TransportError::protocol("connect", format!("invalid fallback URL: {}", e))
		})?;

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.connect_timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| {
				TransportError::network("connect", format!("failed to build HTTP client: {}", e))
			})?;
		let client = create_retryable_http_client(
			&HttpRetryConfig::default(),
			base_client,
			Some(TransientErrorRetryStrategy),
		);

		Ok(Self {
			source,
			base_url,
			client,
			timeout,
		})
	}

	/// Relative REST path answering a logical call.
	fn path_for(call: &LogicalCall) -> String {
		let encode = |s: &str| urlencoding::encode(s).into_owned();
		match call {
			LogicalCall::ChainInfo => "api/chain/info".to_string(),
			LogicalCall::MiningInfo => "api/chain/mining".to_string(),
			LogicalCall::NetworkInfo => "api/chain/network".to_string(),
			LogicalCall::Block { hash } => format!("api/block/{}", encode(hash)),
			LogicalCall::BlockHash { height } => format!("api/block-index/{}", height),
			LogicalCall::Transaction { txid } => format!("api/tx/{}", encode(txid)),
			LogicalCall::MempoolInfo => "api/mempool/info".to_string(),
			LogicalCall::RawMempool => "api/mempool/txids".to_string(),
			LogicalCall::AddressBalance { address } => {
				format!("api/address/{}/balance", encode(address))
			}
			LogicalCall::AddressUtxos { address } => {
				format!("api/address/{}/utxos", encode(address))
			}
			LogicalCall::Identity { name } => format!("api/identity/{}", encode(name)),
		}
	}

	async fn fetch(&self, path: &str, timeout: Duration) -> Result<Value, TransportError> {
		let url = self.base_url.join(path).map_err(|e| {
			TransportError::protocol(path, format!("invalid request path: {}", e))
		})?;

		let mut builder = self.client.get(url).timeout(timeout);
		if let Some(api_key) = &self.source.api_key {
			builder = builder.header("X-API-Key", api_key);
		}

		let response = builder.send().await.map_err(|e| match &e {
			reqwest_middleware::Error::Reqwest(inner)
				if inner.is_connect() || inner.is_timeout() || inner.is_request() =>
			{
				TransportError::network(path, e.to_string())
			}
			_ => TransportError::protocol(path, e.to_string()),
		})?;

		let status = response.status();
		if !status.is_success() {
			return Err(TransportError::http_status(path, status.as_u16()));
		}

		let raw = response.json::<Value>().await.map_err(|e| {
			TransportError::protocol(path, format!("malformed JSON response: {}", e))
		})?;

		Ok(unwrap_envelope(raw))
	}
}

/// Unwraps a single-key `data`/`result` envelope, if present.
fn unwrap_envelope(raw: Value) -> Value {
	match &raw {
		Value::Object(map) if map.len() == 1 => {
			if let Some(inner) = map.get("data").or_else(|| map.get("result")) {
				return inner.clone();
			}
			raw
		}
		_ => raw,
	}
}

#[async_trait]
impl SourceClient for RestSource {
	fn name(&self) -> &str {
		&self.source.name
	}

	fn kind(&self) -> SourceKind {
		self.source.kind
	}

	async fn execute(&self, call: &LogicalCall) -> Result<Value, TransportError> {
		self.fetch(&Self::path_for(call), self.timeout).await
	}

	async fn probe(&self) -> Result<(), TransportError> {
		self.fetch(&Self::path_for(&LogicalCall::ChainInfo), PROBE_TIMEOUT)
			.await
			.map(|_| ())
	}
}
