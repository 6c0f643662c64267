//! HTTP transport for JSON-RPC daemon endpoints.
//!
//! Issues single JSON-RPC 2.0 calls over HTTP POST with basic auth, a
//! per-call timeout and a single automatic retry for idempotent read
//! methods on connection-class failures. Protocol errors are never retried.

use std::time::Duration;

use base64::Engine;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{Retryable, RetryableStrategy};
use serde_json::Value;
use url::Url;

use crate::{
	models::{DataSource, RpcRequest, RpcResponse},
	services::transport::TransportError,
	utils::{create_retryable_http_client, HttpRetryConfig},
};

/// Methods with side effects on the daemon; these never go through the
/// retrying client because a retry could double-apply them.
const NON_IDEMPOTENT_METHODS: [&str; 2] = ["sendrawtransaction", "submitblock"];

/// Retry strategy that retries connection-class failures only.
///
/// Any HTTP response, including error statuses, is a deterministic answer
/// from a reachable source and must not be retried at this level.
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(_) => None,
			Err(e) if is_connection_class(e) => Some(Retryable::Transient),
			Err(_) => Some(Retryable::Fatal),
		}
	}
}

fn is_connection_class(error: &reqwest_middleware::Error) -> bool {
	match error {
		reqwest_middleware::Error::Reqwest(e) => {
			e.is_connect() || e.is_timeout() || e.is_request()
		}
		reqwest_middleware::Error::Middleware(_) => false,
	}
}

/// HTTP transport client for one JSON-RPC endpoint.
///
/// Holds two middleware clients: one with a single-retry policy for
/// idempotent reads and one without retries for everything else. The
/// client is thread-safe and can be shared across tasks.
#[derive(Debug)]
pub struct HttpTransport {
	source_name: String,
	endpoint: Url,
	/// Precomputed `Basic` authorization header value.
	auth_header: Option<String>,
	read_client: ClientWithMiddleware,
	write_client: ClientWithMiddleware,
	default_timeout: Duration,
}

impl HttpTransport {
	/// Creates a transport for the given source.
	///
	/// # Arguments
	/// * `source` - Endpoint, credentials and service name
	/// * `default_timeout` - Timeout applied when the caller gives none
	pub fn new(source: &DataSource, default_timeout: Duration) -> Result<Self, TransportError> {
		let endpoint = Url::parse(&source.base_url).map_err(|e| {
			TransportError::protocol("connect", format!("invalid endpoint URL: {}", e))
		})?;

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.connect_timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| {
				TransportError::network("connect", format!("failed to build HTTP client: {}", e))
			})?;

		let read_client = create_retryable_http_client(
			&HttpRetryConfig::default(),
			base_client.clone(),
			Some(TransientErrorRetryStrategy),
		);
		let write_client = create_retryable_http_client(
			&HttpRetryConfig::no_retries(),
			base_client,
			Some(TransientErrorRetryStrategy),
		);

		let auth_header = source.credentials.as_ref().map(|c| {
			let encoded = base64::engine::general_purpose::STANDARD
				.encode(format!("{}:{}", c.username, c.password));
			format!("Basic {}", encoded)
		});

		Ok(Self {
			source_name: source.name.clone(),
			endpoint,
			auth_header,
			read_client,
			write_client,
			default_timeout,
		})
	}

	pub fn source_name(&self) -> &str {
		&self.source_name
	}

	pub fn default_timeout(&self) -> Duration {
		self.default_timeout
	}

	/// Issues a single call with the default timeout.
	///
	/// A JSON-RPC error object in the response is surfaced as a protocol
	/// error; use [`Self::call_raw`] to receive it unmapped.
	pub async fn call(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError> {
		self.call_with_timeout(request, self.default_timeout).await
	}

	/// Issues a single call with an explicit timeout.
	pub async fn call_with_timeout(
		&self,
		request: &RpcRequest,
		timeout: Duration,
	) -> Result<RpcResponse, TransportError> {
		let response = self.call_raw_with_timeout(request, timeout).await?;
		if let Some(error) = &response.error {
			return Err(TransportError::rpc_error(
				&request.method,
				error.code,
				&error.message,
			));
		}
		Ok(response)
	}

	/// Issues a single call, returning the response with any JSON-RPC
	/// error object intact. The batch coalescer relies on this to keep
	/// per-entry errors in place.
	pub async fn call_raw(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError> {
		self.call_raw_with_timeout(request, self.default_timeout)
			.await
	}

	async fn call_raw_with_timeout(
		&self,
		request: &RpcRequest,
		timeout: Duration,
	) -> Result<RpcResponse, TransportError> {
		let body = serde_json::to_value(request).map_err(|e| {
			TransportError::protocol(&request.method, format!("failed to encode request: {}", e))
		})?;
		let idempotent = !NON_IDEMPOTENT_METHODS.contains(&request.method.as_str());
		let raw = self
			.post_json(&body, timeout, idempotent, &request.method)
			.await?;

		serde_json::from_value(raw).map_err(|e| {
			TransportError::protocol(&request.method, format!("malformed RPC response: {}", e))
		})
	}

	/// Posts an arbitrary JSON body to the endpoint and decodes the reply
	/// as JSON. The batch coalescer posts request arrays through this.
	///
	/// # Arguments
	/// * `body` - JSON payload to POST
	/// * `timeout` - Per-call timeout; a timed-out call is a network error
	/// * `idempotent` - Whether the retrying client may be used
	/// * `label` - Method name used in error messages
	pub async fn post_json(
		&self,
		body: &Value,
		timeout: Duration,
		idempotent: bool,
		label: &str,
	) -> Result<Value, TransportError> {
		let client = if idempotent {
			&self.read_client
		} else {
			&self.write_client
		};

		let mut builder = client
			.post(self.endpoint.clone())
			.json(body)
			.timeout(timeout);
		if let Some(auth) = &self.auth_header {
			builder = builder.header(reqwest::header::AUTHORIZATION, auth);
		}

		let response = builder.send().await.map_err(|e| {
			if is_connection_class(&e) {
				TransportError::network(label, e.to_string())
			} else {
				TransportError::protocol(label, e.to_string())
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			return Err(TransportError::http_status(label, status.as_u16()));
		}

		response.json::<Value>().await.map_err(|e| {
			if e.is_timeout() {
				TransportError::network(label, e.to_string())
			} else {
				TransportError::protocol(label, format!("malformed JSON response: {}", e))
			}
		})
	}
}
