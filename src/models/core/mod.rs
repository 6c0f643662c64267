//! Core domain models for the RPC access layer.
//!
//! This module contains the fundamental data structures that represent:
//! - RPC wire types: JSON-RPC 2.0 requests and responses
//! - Logical calls: queries the gateway can answer and their data classes
//! - Normalized records: canonical result shapes shared by all sources
//! - Sources: data source descriptors and credentials
//! - Gateway configuration: per-network source lists, TTLs and thresholds

mod call;
mod gateway;
mod normalized;
mod rpc;
mod source;

pub use call::{DataClass, LogicalCall};
pub use gateway::{
	BreakerSettings, DaemonConfig, FallbackSourceConfig, GatewayConfig, TransportSettings,
	TtlTable,
};
pub use normalized::{
	AddressBalance, AddressUtxo, Block, ChainInfo, Identity, MempoolInfo, MiningInfo, NetworkInfo,
	TransactionSummary,
};
pub use rpc::{RpcErrorObject, RpcRequest, RpcResponse};
pub use source::{Credentials, DataSource, SourceKind};
