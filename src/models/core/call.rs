//! Logical calls and data classes.
//!
//! A [`LogicalCall`] names one query the gateway can answer, independent of
//! which data source ends up answering it. Every call belongs to a
//! [`DataClass`] that drives its cache TTL and cache-key prefix.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Identifiers longer than this are digested before being used in cache keys.
const MAX_KEY_IDENTIFIER_LENGTH: usize = 64;

/// Cache/TTL class of a logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataClass {
	/// Chain, mining and network status queries.
	ChainStatus,
	/// Immutable block and transaction data.
	Block,
	/// Mempool contents and statistics.
	Mempool,
	/// Address balances and UTXOs.
	Address,
	/// On-chain identity records.
	Identity,
}

impl DataClass {
	/// Cache-key prefix for the class, also used for pattern invalidation.
	pub fn key_prefix(&self) -> &'static str {
		match self {
			Self::ChainStatus => "chain",
			Self::Block => "block",
			Self::Mempool => "mempool",
			Self::Address => "address",
			Self::Identity => "identity",
		}
	}

	/// Parses an admin-supplied class name, as used by cache invalidation.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"chain" => Some(Self::ChainStatus),
			"block" => Some(Self::Block),
			"mempool" => Some(Self::Mempool),
			"address" => Some(Self::Address),
			"identity" => Some(Self::Identity),
			_ => None,
		}
	}
}

/// One logical query the gateway can resolve against any configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalCall {
	ChainInfo,
	MiningInfo,
	NetworkInfo,
	Block { hash: String },
	BlockHash { height: u64 },
	Transaction { txid: String },
	MempoolInfo,
	RawMempool,
	AddressBalance { address: String },
	AddressUtxos { address: String },
	Identity { name: String },
}

impl LogicalCall {
	/// The JSON-RPC method name used against the primary daemon.
	pub fn method(&self) -> &'static str {
		match self {
			Self::ChainInfo => "getblockchaininfo",
			Self::MiningInfo => "getmininginfo",
			Self::NetworkInfo => "getnetworkinfo",
			Self::Block { .. } => "getblock",
			Self::BlockHash { .. } => "getblockhash",
			Self::Transaction { .. } => "getrawtransaction",
			Self::MempoolInfo => "getmempoolinfo",
			Self::RawMempool => "getrawmempool",
			Self::AddressBalance { .. } => "getaddressbalance",
			Self::AddressUtxos { .. } => "getaddressutxos",
			Self::Identity { .. } => "getidentity",
		}
	}

	/// Positional JSON-RPC parameters for the primary daemon.
	pub fn params(&self) -> Vec<Value> {
		match self {
			Self::ChainInfo
			| Self::MiningInfo
			| Self::NetworkInfo
			| Self::MempoolInfo
			| Self::RawMempool => vec![],
			Self::Block { hash } => vec![json!(hash)],
			Self::BlockHash { height } => vec![json!(height)],
			// Verbosity 1 returns the decoded transaction instead of raw hex
			Self::Transaction { txid } => vec![json!(txid), json!(1)],
			Self::AddressBalance { address } | Self::AddressUtxos { address } => {
				vec![json!({ "addresses": [address] })]
			}
			Self::Identity { name } => vec![json!(name)],
		}
	}

	/// The data class driving this call's TTL and cache-key prefix.
	pub fn data_class(&self) -> DataClass {
		match self {
			Self::ChainInfo | Self::MiningInfo | Self::NetworkInfo => DataClass::ChainStatus,
			Self::Block { .. } | Self::BlockHash { .. } | Self::Transaction { .. } => {
				DataClass::Block
			}
			Self::MempoolInfo | Self::RawMempool => DataClass::Mempool,
			Self::AddressBalance { .. } | Self::AddressUtxos { .. } => DataClass::Address,
			Self::Identity { .. } => DataClass::Identity,
		}
	}

	/// The single identifying parameter of the call, if it has one.
	pub fn identifier(&self) -> Option<&str> {
		match self {
			Self::Block { hash } => Some(hash),
			Self::Transaction { txid } => Some(txid),
			Self::AddressBalance { address } | Self::AddressUtxos { address } => Some(address),
			Self::Identity { name } => Some(name),
			_ => None,
		}
	}

	/// Deterministic cache key: `class:method[:identifier]`.
	///
	/// Identifiers that are long or contain characters unsafe for a flat
	/// key namespace (identity names can hold arbitrary UTF-8) collapse to
	/// a SHA-256 hex digest.
	pub fn cache_key(&self) -> String {
		let prefix = self.data_class().key_prefix();
		let method = self.method();
		match self {
			Self::BlockHash { height } => format!("{}:{}:{}", prefix, method, height),
			_ => match self.identifier() {
				Some(identifier) => {
					format!("{}:{}:{}", prefix, method, safe_key_identifier(identifier))
				}
				None => format!("{}:{}", prefix, method),
			},
		}
	}
}

/// Returns the identifier unchanged when it is short and key-safe,
/// otherwise its SHA-256 hex digest.
fn safe_key_identifier(identifier: &str) -> String {
	let key_safe = identifier.len() <= MAX_KEY_IDENTIFIER_LENGTH
		&& identifier
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@'));
	if key_safe {
		identifier.to_string()
	} else {
		hex::encode(Sha256::digest(identifier.as_bytes()))
	}
}
