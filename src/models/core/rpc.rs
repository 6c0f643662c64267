//! JSON-RPC 2.0 wire types shared by the transport and batch layers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single JSON-RPC 2.0 request.
///
/// Requests are immutable once constructed. Ids are UUID v4 strings so that
/// batch responses can be correlated back to their requests unambiguously.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
	pub jsonrpc: String,
	pub method: String,
	pub params: Vec<Value>,
	pub id: String,
}

impl RpcRequest {
	/// Creates a new request for `method` with positional `params`.
	pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
		Self {
			jsonrpc: "2.0".to_string(),
			method: method.into(),
			params,
			id: Uuid::new_v4().to_string(),
		}
	}
}

/// The error object of a JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
}

/// A single JSON-RPC 2.0 response.
///
/// Exactly one of `result`/`error` is populated by a conforming backend.
/// The id is kept as a raw [`Value`] because some daemons echo string ids
/// back as numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
	#[serde(default)]
	pub result: Option<Value>,
	#[serde(default)]
	pub error: Option<RpcErrorObject>,
	#[serde(default)]
	pub id: Option<Value>,
}

impl RpcResponse {
	/// Returns the response id as a string for request correlation.
	///
	/// String ids are returned as-is; numeric ids are stringified.
	pub fn correlation_id(&self) -> Option<String> {
		match &self.id {
			Some(Value::String(s)) => Some(s.clone()),
			Some(Value::Number(n)) => Some(n.to_string()),
			_ => None,
		}
	}

	/// Whether the response carries a JSON-RPC error object.
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}
