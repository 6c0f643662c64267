//! RPC access layer entry point.
//!
//! This binary provides a command-line front to the gateway stack. It
//! loads the per-network gateway configurations, wires one gateway for
//! the requested network, and executes a single query or admin command
//! against it.
//!
//! # Flow
//! 1. Loads configurations from the default directory (or `--config-path`)
//! 2. Initializes the gateway for the requested network
//! 3. Executes the requested query through cache, fallback coordination
//!    and circuit breakers, exactly as an embedding explorer would
//! 4. Prints the result as pretty JSON

use std::env::{set_var, var};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, Command};
use dotenvy::dotenv;
use tracing::info;

use stakescan_rpc::{
	bootstrap::{initialize_gateway, initialize_gateway_pool, Result},
	models::DataClass,
	repositories::GatewayRepository,
	utils::logging::setup_logging,
};

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

/// Main entry point for the RPC access layer CLI.
///
/// # Errors
/// Returns an error if configuration loading fails or the requested
/// query cannot be answered by any source.
#[tokio::main]
async fn main() -> Result<()> {
	// Initialize command-line interface
	let matches = Command::new("stakescan-rpc")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Resilient RPC access layer for proof-of-stake chain explorers. Queries are served \
			 from cache when fresh, the local daemon when reachable, and public explorer APIs \
			 otherwise.",
		)
		.arg(
			Arg::new("config-path")
				.long("config-path")
				.help("Directory holding gateway *.json files (default: config/gateways)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("network")
				.long("network")
				.help("Network slug to query")
				.value_name("NETWORK_SLUG"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("networks")
				.long("networks")
				.help("List configured networks and exit")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("health")
				.long("health")
				.help("Probe every configured source and print its status")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("info")
				.long("info")
				.help("Print chain, mining and network status")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("block")
				.long("block")
				.help("Fetch a block by height or hash")
				.value_name("HEIGHT_OR_HASH"),
		)
		.arg(
			Arg::new("tx")
				.long("tx")
				.help("Fetch a transaction summary by txid")
				.value_name("TXID"),
		)
		.arg(
			Arg::new("mempool")
				.long("mempool")
				.help("Print mempool status and pending txids")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("balance")
				.long("balance")
				.help("Fetch the balance of an address")
				.value_name("ADDRESS"),
		)
		.arg(
			Arg::new("utxos")
				.long("utxos")
				.help("Fetch the unspent outputs of an address")
				.value_name("ADDRESS"),
		)
		.arg(
			Arg::new("identity")
				.long("identity")
				.help("Look up an on-chain identity by name")
				.value_name("NAME"),
		)
		.arg(
			Arg::new("stats")
				.long("stats")
				.help("Print cache statistics and breaker snapshots")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("invalidate")
				.long("invalidate")
				.help("Drop cached entries (chain, block, mempool, address, identity, or all)")
				.value_name("CLASS"),
		)
		.arg(
			Arg::new("reset-breaker")
				.long("reset-breaker")
				.help("Force-close the circuit breaker of one source, or 'all'")
				.value_name("SOURCE"),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("RUST_LOG").is_err() {
			set_var("RUST_LOG", level);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_path = matches.get_one::<String>("config-path").map(PathBuf::from);

	if matches.get_flag("networks") {
		let pool =
			initialize_gateway_pool::<GatewayRepository>(None, config_path.as_deref())?;
		for slug in pool.networks() {
			println!("{}", slug);
		}
		return Ok(());
	}

	let network = matches
		.get_one::<String>("network")
		.cloned()
		.context("--network is required (use --networks to list the configured ones)")?;
	let gateway = initialize_gateway(config_path.as_deref(), &network)?;

	if matches.get_flag("health") {
		let health = gateway.health_check().await;
		return print_json(&health);
	}

	if matches.get_flag("info") {
		let chain = gateway.get_chain_info().await?;
		let mining = gateway.get_mining_info().await?;
		let net = gateway.get_network_info().await?;
		print_json(&chain)?;
		print_json(&mining)?;
		print_json(&net)?;
		if gateway.is_serving_fallback() {
			info!("answers were served by a fallback source");
		}
		return Ok(());
	}

	if let Some(target) = matches.get_one::<String>("block") {
		let block = match target.parse::<u64>() {
			Ok(height) => gateway.get_block_by_height(height).await?,
			Err(_) => gateway.get_block(target).await?,
		};
		return print_json(&block);
	}

	if let Some(txid) = matches.get_one::<String>("tx") {
		let tx = gateway.get_transaction(txid).await?;
		return print_json(&tx);
	}

	if matches.get_flag("mempool") {
		let mempool = gateway.get_mempool_info().await?;
		let txids = gateway.get_raw_mempool().await?;
		print_json(&mempool)?;
		return print_json(&txids);
	}

	if let Some(address) = matches.get_one::<String>("balance") {
		let balance = gateway.get_address_balance(address).await?;
		return print_json(&balance);
	}

	if let Some(address) = matches.get_one::<String>("utxos") {
		let utxos = gateway.get_address_utxos(address).await?;
		return print_json(&utxos);
	}

	if let Some(name) = matches.get_one::<String>("identity") {
		let identity = gateway.get_identity(name).await?;
		return print_json(&identity);
	}

	if matches.get_flag("stats") {
		let stats = gateway.cache_stats().await;
		let breakers = gateway.breaker_snapshots().await;
		print_json(&stats)?;
		return print_json(&breakers);
	}

	if let Some(class) = matches.get_one::<String>("invalidate") {
		let removed = if class == "all" {
			gateway.invalidate_all().await
		} else {
			let class = DataClass::parse(class)
				.with_context(|| format!("unknown data class '{}'", class))?;
			gateway.invalidate_class(class).await
		};
		info!(removed, "cache entries invalidated");
		return Ok(());
	}

	if let Some(source) = matches.get_one::<String>("reset-breaker") {
		if source == "all" {
			gateway.reset_all_breakers().await;
			info!("all breakers reset");
		} else if gateway.reset_breaker(source).await {
			info!(source, "breaker reset");
		} else {
			info!(source, "no breaker recorded for source");
		}
		return Ok(());
	}

	// No command given: report overall status
	let health = gateway.health_check().await;
	print_json(&health)
}
