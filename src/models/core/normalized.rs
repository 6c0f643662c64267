//! Canonical result records.
//!
//! Every logical call resolves to one canonical shape regardless of which
//! data source answered. The fallback coordinator's projection guarantees
//! all fields are present, so callers never branch on the answering source.
//! Field defaults mirror the projection defaults in
//! `services::fallback::normalize`.

use serde::{Deserialize, Serialize};

/// Canonical `getblockchaininfo` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChainInfo {
	pub chain: String,
	pub blocks: u64,
	pub headers: u64,
	pub best_block_hash: String,
	pub difficulty: f64,
	pub median_time: u64,
	pub verification_progress: f64,
	pub chain_work: String,
}

/// Canonical `getmininginfo` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MiningInfo {
	pub blocks: u64,
	pub difficulty: f64,
	pub network_hash_ps: f64,
	pub pooled_tx: u64,
	pub chain: String,
	pub staking: bool,
}

/// Canonical `getnetworkinfo` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkInfo {
	pub version: u64,
	pub subversion: String,
	pub protocol_version: u64,
	pub connections: u64,
	pub relay_fee: f64,
}

/// Canonical verbose block shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Block {
	pub hash: String,
	pub height: u64,
	/// -1 when the block is not on the active chain.
	pub confirmations: i64,
	pub time: u64,
	pub median_time: u64,
	pub size: u64,
	pub merkle_root: String,
	pub tx: Vec<String>,
	pub difficulty: f64,
	pub previous_block_hash: String,
	pub next_block_hash: String,
	/// Proof type of the block: "stake" or "work".
	pub validation_type: String,
}

/// Canonical verbose transaction shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransactionSummary {
	pub txid: String,
	pub block_hash: String,
	/// 0 while the transaction is unconfirmed.
	pub confirmations: i64,
	pub time: u64,
	pub size: u64,
	pub version: u64,
	pub locktime: u64,
}

/// Canonical `getmempoolinfo` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MempoolInfo {
	pub size: u64,
	pub bytes: u64,
	pub usage: u64,
	pub mempool_min_fee: f64,
}

/// Canonical address balance shape.
///
/// Amounts are in the source's native base unit; unit conversion is a
/// presentation concern left to callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AddressBalance {
	pub address: String,
	pub balance: f64,
	pub received: f64,
}

/// Canonical unspent output shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AddressUtxo {
	pub txid: String,
	pub output_index: u64,
	pub script: String,
	pub amount: f64,
	pub height: u64,
}

/// Canonical on-chain identity record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Identity {
	pub name: String,
	pub identity_address: String,
	pub primary_addresses: Vec<String>,
	pub minimum_signatures: u64,
	pub revocation_authority: String,
	pub recovery_authority: String,
	pub status: String,
	pub block_height: u64,
}

impl Default for Identity {
	fn default() -> Self {
		Self {
			name: String::new(),
			identity_address: String::new(),
			primary_addresses: Vec::new(),
			minimum_signatures: 0,
			revocation_authority: String::new(),
			recovery_authority: String::new(),
			status: "active".to_string(),
			block_height: 0,
		}
	}
}
