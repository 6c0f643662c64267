//! Response normalization.
//!
//! Each data source answers in its own shape: the daemon uses lowercase
//! run-together keys (`bestblockhash`), explorer APIs use camelCase
//! (`bestBlockHash`), older ones snake_case. Projection collapses all
//! known variants into one canonical schema per logical call. Projection
//! is total: every canonical field is populated from the source or from
//! its explicit default, so callers never branch on which source answered.

use serde_json::{json, Map, Value};

use crate::models::LogicalCall;

/// Default applied when no alias of a canonical field is present, also
/// the type the found value is coerced towards.
#[derive(Debug, Clone, Copy)]
enum FieldDefault {
	Text(&'static str),
	Uint(u64),
	Int(i64),
	Float(f64),
	Flag(bool),
	List,
}

impl FieldDefault {
	fn value(&self) -> Value {
		match self {
			Self::Text(s) => json!(s),
			Self::Uint(n) => json!(n),
			Self::Int(n) => json!(n),
			Self::Float(f) => json!(f),
			Self::Flag(b) => json!(b),
			Self::List => json!([]),
		}
	}
}

/// One canonical field with the source-key variants it collapses.
struct FieldSpec {
	canonical: &'static str,
	aliases: &'static [&'static str],
	default: FieldDefault,
}

macro_rules! field {
	($canonical:literal, [$($alias:literal),*], $default:expr) => {
		FieldSpec {
			canonical: $canonical,
			aliases: &[$($alias),*],
			default: $default,
		}
	};
}

const CHAIN_INFO_FIELDS: &[FieldSpec] = &[
	field!("chain", ["chain", "network", "chainName"], FieldDefault::Text("")),
	field!("blocks", ["blocks", "height", "blockHeight", "block_count"], FieldDefault::Uint(0)),
	field!("headers", ["headers", "headerHeight", "header_height"], FieldDefault::Uint(0)),
	field!(
		"best_block_hash",
		["bestblockhash", "bestBlockHash", "best_block_hash", "tipHash", "tiphash"],
		FieldDefault::Text("")
	),
	field!("difficulty", ["difficulty"], FieldDefault::Float(0.0)),
	field!("median_time", ["mediantime", "medianTime", "median_time"], FieldDefault::Uint(0)),
	field!(
		"verification_progress",
		["verificationprogress", "verificationProgress", "verification_progress"],
		FieldDefault::Float(1.0)
	),
	field!("chain_work", ["chainwork", "chainWork", "chain_work"], FieldDefault::Text("")),
];

const MINING_INFO_FIELDS: &[FieldSpec] = &[
	field!("blocks", ["blocks", "height", "blockHeight"], FieldDefault::Uint(0)),
	field!("difficulty", ["difficulty"], FieldDefault::Float(0.0)),
	field!(
		"network_hash_ps",
		["networkhashps", "networkHashPs", "network_hashps", "networkhashrate"],
		FieldDefault::Float(0.0)
	),
	field!("pooled_tx", ["pooledtx", "pooledTx", "pooled_tx"], FieldDefault::Uint(0)),
	field!("chain", ["chain", "network"], FieldDefault::Text("")),
	field!(
		"staking",
		["staking", "stakingActive", "staking_active"],
		FieldDefault::Flag(false)
	),
];

const NETWORK_INFO_FIELDS: &[FieldSpec] = &[
	field!("version", ["version"], FieldDefault::Uint(0)),
	field!(
		"subversion",
		["subversion", "subVersion", "useragent", "user_agent"],
		FieldDefault::Text("")
	),
	field!(
		"protocol_version",
		["protocolversion", "protocolVersion", "protocol_version"],
		FieldDefault::Uint(0)
	),
	field!(
		"connections",
		["connections", "peerCount", "peer_count"],
		FieldDefault::Uint(0)
	),
	field!("relay_fee", ["relayfee", "relayFee", "relay_fee"], FieldDefault::Float(0.0)),
];

const BLOCK_FIELDS: &[FieldSpec] = &[
	field!("hash", ["hash", "blockHash", "block_hash"], FieldDefault::Text("")),
	field!("height", ["height", "blockHeight", "block_height"], FieldDefault::Uint(0)),
	field!("confirmations", ["confirmations"], FieldDefault::Int(0)),
	field!("time", ["time", "blockTime", "block_time"], FieldDefault::Uint(0)),
	field!("median_time", ["mediantime", "medianTime", "median_time"], FieldDefault::Uint(0)),
	field!("size", ["size"], FieldDefault::Uint(0)),
	field!(
		"merkle_root",
		["merkleroot", "merkleRoot", "merkle_root"],
		FieldDefault::Text("")
	),
	field!("tx", ["tx", "txs", "txids", "transactions"], FieldDefault::List),
	field!("difficulty", ["difficulty"], FieldDefault::Float(0.0)),
	field!(
		"previous_block_hash",
		["previousblockhash", "previousBlockHash", "previous_block_hash", "prevHash"],
		FieldDefault::Text("")
	),
	field!(
		"next_block_hash",
		["nextblockhash", "nextBlockHash", "next_block_hash"],
		FieldDefault::Text("")
	),
	// PoS daemons tag blocks as staked or mined
	field!(
		"validation_type",
		["validationtype", "validationType", "blocktype", "proofType", "prooftype"],
		FieldDefault::Text("work")
	),
];

const TRANSACTION_FIELDS: &[FieldSpec] = &[
	field!("txid", ["txid", "txHash", "tx_hash", "hash"], FieldDefault::Text("")),
	field!("block_hash", ["blockhash", "blockHash", "block_hash"], FieldDefault::Text("")),
	field!("confirmations", ["confirmations"], FieldDefault::Int(0)),
	field!("time", ["time", "blocktime", "blockTime", "block_time"], FieldDefault::Uint(0)),
	field!("size", ["size", "vsize"], FieldDefault::Uint(0)),
	field!("version", ["version"], FieldDefault::Uint(0)),
	field!("locktime", ["locktime", "lockTime", "lock_time"], FieldDefault::Uint(0)),
];

const MEMPOOL_INFO_FIELDS: &[FieldSpec] = &[
	field!("size", ["size", "count", "txCount", "tx_count"], FieldDefault::Uint(0)),
	field!("bytes", ["bytes", "totalBytes", "total_bytes"], FieldDefault::Uint(0)),
	field!("usage", ["usage"], FieldDefault::Uint(0)),
	field!(
		"mempool_min_fee",
		["mempoolminfee", "mempoolMinFee", "minFee", "min_fee"],
		FieldDefault::Float(0.0)
	),
];

const ADDRESS_BALANCE_FIELDS: &[FieldSpec] = &[
	field!("address", ["address", "addr"], FieldDefault::Text("")),
	field!("balance", ["balance", "balanceSat", "balance_sat"], FieldDefault::Float(0.0)),
	field!(
		"received",
		["received", "totalReceived", "total_received", "receivedSat"],
		FieldDefault::Float(0.0)
	),
];

const ADDRESS_UTXO_FIELDS: &[FieldSpec] = &[
	field!("txid", ["txid", "txHash", "tx_hash"], FieldDefault::Text("")),
	field!(
		"output_index",
		["outputIndex", "output_index", "vout", "n"],
		FieldDefault::Uint(0)
	),
	field!(
		"script",
		["script", "scriptPubKey", "script_pub_key"],
		FieldDefault::Text("")
	),
	field!("amount", ["satoshis", "amount", "value"], FieldDefault::Float(0.0)),
	field!("height", ["height", "blockHeight", "block_height"], FieldDefault::Uint(0)),
];

const IDENTITY_FIELDS: &[FieldSpec] = &[
	field!(
		"name",
		["name", "identityName", "identity_name", "friendlyname"],
		FieldDefault::Text("")
	),
	field!(
		"identity_address",
		["identityaddress", "identityAddress", "identity_address", "address"],
		FieldDefault::Text("")
	),
	field!(
		"primary_addresses",
		["primaryaddresses", "primaryAddresses", "primary_addresses"],
		FieldDefault::List
	),
	field!(
		"minimum_signatures",
		["minimumsignatures", "minimumSignatures", "minimum_signatures"],
		FieldDefault::Uint(0)
	),
	field!(
		"revocation_authority",
		["revocationauthority", "revocationAuthority", "revocation_authority"],
		FieldDefault::Text("")
	),
	field!(
		"recovery_authority",
		["recoveryauthority", "recoveryAuthority", "recovery_authority"],
		FieldDefault::Text("")
	),
	field!("status", ["status"], FieldDefault::Text("active")),
	field!(
		"block_height",
		["blockheight", "blockHeight", "block_height"],
		FieldDefault::Uint(0)
	),
];

/// Projects a source's raw answer for `call` into the canonical shape.
pub fn project(call: &LogicalCall, raw: &Value) -> Value {
	match call {
		LogicalCall::ChainInfo => {
			let mut object = project_object(CHAIN_INFO_FIELDS, raw);
			// A source without a separate header count is fully synced
			if object.get("headers") == Some(&json!(0)) {
				let blocks = object.get("blocks").cloned().unwrap_or(json!(0));
				object.insert("headers".to_string(), blocks);
			}
			Value::Object(object)
		}
		LogicalCall::MiningInfo => Value::Object(project_object(MINING_INFO_FIELDS, raw)),
		LogicalCall::NetworkInfo => Value::Object(project_object(NETWORK_INFO_FIELDS, raw)),
		LogicalCall::Block { .. } => Value::Object(project_object(BLOCK_FIELDS, raw)),
		LogicalCall::BlockHash { .. } => project_hash_value(raw),
		LogicalCall::Transaction { .. } => Value::Object(project_object(TRANSACTION_FIELDS, raw)),
		LogicalCall::MempoolInfo => Value::Object(project_object(MEMPOOL_INFO_FIELDS, raw)),
		LogicalCall::RawMempool => coerce_string_list(raw),
		LogicalCall::AddressBalance { address } => {
			let mut object = project_object(ADDRESS_BALANCE_FIELDS, raw);
			// The daemon omits the queried address; inject it
			if object.get("address") == Some(&json!("")) {
				object.insert("address".to_string(), json!(address));
			}
			Value::Object(object)
		}
		LogicalCall::AddressUtxos { .. } => match raw {
			Value::Array(items) => Value::Array(
				items
					.iter()
					.map(|item| Value::Object(project_object(ADDRESS_UTXO_FIELDS, item)))
					.collect(),
			),
			_ => json!([]),
		},
		LogicalCall::Identity { name } => {
			let flattened = flatten_identity(raw);
			let mut object = project_object(IDENTITY_FIELDS, &flattened);
			if object.get("name") == Some(&json!("")) {
				object.insert("name".to_string(), json!(name));
			}
			Value::Object(object)
		}
	}
}

/// Applies a field table to one raw object.
fn project_object(fields: &[FieldSpec], raw: &Value) -> Map<String, Value> {
	let mut object = Map::with_capacity(fields.len());
	for field in fields {
		let found = lookup(field, raw);
		let value = match found {
			Some(value) => coerce(value, field.default),
			None => field.default.value(),
		};
		object.insert(field.canonical.to_string(), value);
	}
	object
}

fn lookup<'a>(field: &FieldSpec, raw: &'a Value) -> Option<&'a Value> {
	let map = raw.as_object()?;
	if let Some(value) = map.get(field.canonical) {
		if !value.is_null() {
			return Some(value);
		}
	}
	for alias in field.aliases {
		if let Some(value) = map.get(*alias) {
			if !value.is_null() {
				return Some(value);
			}
		}
	}
	None
}

/// Coerces a found value towards its canonical type; values that cannot
/// be coerced fall back to the field default so projection stays total.
fn coerce(found: &Value, default: FieldDefault) -> Value {
	match default {
		FieldDefault::Text(_) => match found {
			Value::String(_) => found.clone(),
			Value::Number(n) => json!(n.to_string()),
			_ => default.value(),
		},
		FieldDefault::Uint(_) => match found {
			Value::Number(n) if n.as_u64().is_some() => found.clone(),
			Value::Number(n) => json!(n.as_f64().unwrap_or(0.0).max(0.0) as u64),
			Value::String(s) => s
				.parse::<u64>()
				.map(|n| json!(n))
				.unwrap_or_else(|_| default.value()),
			_ => default.value(),
		},
		FieldDefault::Int(_) => match found {
			Value::Number(n) if n.as_i64().is_some() => found.clone(),
			Value::String(s) => s
				.parse::<i64>()
				.map(|n| json!(n))
				.unwrap_or_else(|_| default.value()),
			_ => default.value(),
		},
		FieldDefault::Float(_) => match found {
			Value::Number(n) => json!(n.as_f64().unwrap_or(0.0)),
			Value::String(s) => s
				.parse::<f64>()
				.map(|f| json!(f))
				.unwrap_or_else(|_| default.value()),
			_ => default.value(),
		},
		FieldDefault::Flag(_) => match found {
			Value::Bool(_) => found.clone(),
			Value::String(s) => json!(s == "true" || s == "1"),
			Value::Number(n) => json!(n.as_f64().unwrap_or(0.0) != 0.0),
			_ => default.value(),
		},
		FieldDefault::List => coerce_string_list(found),
	}
}

/// Coerces an array into a list of id strings. Sources that return
/// objects per entry (e.g. mempool entries keyed by txid details) are
/// reduced to their `txid`/`hash` field.
fn coerce_string_list(raw: &Value) -> Value {
	match raw {
		Value::Array(items) => Value::Array(
			items
				.iter()
				.filter_map(|item| match item {
					Value::String(s) => Some(json!(s)),
					Value::Object(map) => map
						.get("txid")
						.or_else(|| map.get("hash"))
						.filter(|v| v.is_string())
						.cloned(),
					_ => None,
				})
				.collect(),
		),
		_ => json!([]),
	}
}

/// The block-hash call answers with a bare string on the daemon and a
/// wrapped object on REST sources.
fn project_hash_value(raw: &Value) -> Value {
	match raw {
		Value::String(_) => raw.clone(),
		Value::Object(map) => map
			.get("blockHash")
			.or_else(|| map.get("blockhash"))
			.or_else(|| map.get("block_hash"))
			.or_else(|| map.get("hash"))
			.filter(|v| v.is_string())
			.cloned()
			.unwrap_or(json!("")),
		_ => json!(""),
	}
}

/// The daemon nests the identity record under an `identity` key next to
/// `status`/`blockheight`; merge it up without clobbering the outer keys.
fn flatten_identity(raw: &Value) -> Value {
	let Some(map) = raw.as_object() else {
		return raw.clone();
	};
	let Some(Value::Object(nested)) = map.get("identity") else {
		return raw.clone();
	};

	let mut merged = map.clone();
	merged.remove("identity");
	for (key, value) in nested {
		merged.entry(key.clone()).or_insert_with(|| value.clone());
	}
	Value::Object(merged)
}
