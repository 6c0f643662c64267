//! Domain models and data structures for the RPC access layer.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (RPC wire types, logical calls, canonical records, sources)

mod config;
mod core;

// Re-export core types
pub use core::{
	AddressBalance, AddressUtxo, Block, BreakerSettings, ChainInfo, Credentials, DaemonConfig,
	DataClass, DataSource, FallbackSourceConfig, GatewayConfig, Identity, LogicalCall,
	MempoolInfo, MiningInfo, NetworkInfo, RpcErrorObject, RpcRequest, RpcResponse, SourceKind,
	TransactionSummary, TransportSettings, TtlTable,
};

// Re-export config types
pub use config::{ConfigError, ConfigLoader};
