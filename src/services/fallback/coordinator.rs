//! Fallback coordination.
//!
//! Walks the configured sources in priority order for every logical call:
//! sources with an open breaker are skipped without a network round trip,
//! failures are recorded and the walk continues, and the first success
//! short-circuits. Whatever source answers, the payload is projected into
//! the canonical shape before it is returned, so callers never see which
//! backend served them.

use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Instant,
};

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
	models::{LogicalCall, SourceKind},
	services::breaker::{BreakerError, CircuitBreakerRegistry},
};

use super::{
	error::{AllSourcesExhaustedError, SourceAttempt, SourceError},
	normalize,
	source::SourceClient,
};

/// Probe result for one source, reported by [`FallbackCoordinator::health_check`].
#[derive(Debug, Clone, Serialize)]
pub struct SourceHealth {
	pub name: String,
	pub kind: SourceKind,
	pub healthy: bool,
	pub latency_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Resolves logical calls against an ordered chain of sources.
pub struct FallbackCoordinator {
	sources: Vec<Arc<dyn SourceClient>>,
	breakers: Arc<CircuitBreakerRegistry>,
	serving_fallback: AtomicBool,
}

impl FallbackCoordinator {
	/// `sources` must already be in priority order, primary first.
	pub fn new(sources: Vec<Arc<dyn SourceClient>>, breakers: Arc<CircuitBreakerRegistry>) -> Self {
		Self {
			sources,
			breakers,
			serving_fallback: AtomicBool::new(false),
		}
	}

	/// Answers `call` from the first healthy source, normalized to the
	/// canonical shape.
	pub async fn resolve(&self, call: &LogicalCall) -> Result<Value, AllSourcesExhaustedError> {
		let mut attempts = Vec::new();

		for source in &self.sources {
			let outcome = self
				.breakers
				.execute(source.name(), || source.execute(call))
				.await;

			match outcome {
				Ok(raw) => {
					self.note_serving(source.kind());
					return Ok(normalize::project(call, &raw));
				}
				Err(BreakerError::Open(open)) => {
					debug!(
						source = source.name(),
						method = call.method(),
						"skipping source with open circuit"
					);
					attempts.push(SourceAttempt {
						source: source.name().to_string(),
						error: SourceError::CircuitOpen(open),
					});
				}
				Err(BreakerError::Inner(transport)) => {
					warn!(
						source = source.name(),
						method = call.method(),
						error = %transport,
						"source failed, trying next"
					);
					attempts.push(SourceAttempt {
						source: source.name().to_string(),
						error: SourceError::Transport(transport),
					});
				}
			}
		}

		let exhausted = AllSourcesExhaustedError::new(attempts);
		error!(method = call.method(), error = %exhausted, "all sources exhausted");
		Err(exhausted)
	}

	/// Whether the most recent successful resolution was served by a
	/// fallback source rather than the primary daemon.
	pub fn is_serving_fallback(&self) -> bool {
		self.serving_fallback.load(Ordering::Relaxed)
	}

	/// Probes every source concurrently, bypassing the breakers.
	pub async fn health_check(&self) -> Vec<SourceHealth> {
		let probes = self.sources.iter().map(|source| async move {
			let started = Instant::now();
			let result = source.probe().await;
			let latency_ms = started.elapsed().as_millis() as u64;
			SourceHealth {
				name: source.name().to_string(),
				kind: source.kind(),
				healthy: result.is_ok(),
				latency_ms,
				error: result.err().map(|e| e.to_string()),
			}
		});
		join_all(probes).await
	}

	fn note_serving(&self, kind: SourceKind) {
		let fallback = kind != SourceKind::Primary;
		let was = self.serving_fallback.swap(fallback, Ordering::Relaxed);
		if was != fallback {
			if fallback {
				warn!("primary daemon unavailable, serving from fallback sources");
			} else {
				info!("primary daemon recovered, serving from primary again");
			}
		}
	}
}
