//! Registry of circuit breakers keyed by service name.
//!
//! Breakers are created lazily on first use and live for the process
//! lifetime. The registry uses a fast path with a read lock for existing
//! breakers and a slow path with a write lock for creating new ones.

use std::{collections::HashMap, future::Future, sync::Arc};

use tokio::sync::RwLock;

use crate::{
	models::BreakerSettings,
	services::breaker::{BreakerError, CircuitBreaker, CircuitBreakerSnapshot},
};

/// Thread-safe collection of per-service circuit breakers.
pub struct CircuitBreakerRegistry {
	settings: BreakerSettings,
	breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
	pub fn new(settings: BreakerSettings) -> Self {
		Self {
			settings,
			breakers: RwLock::new(HashMap::new()),
		}
	}

	/// Gets or lazily creates the breaker for `service`.
	pub async fn get_or_create(&self, service: &str) -> Arc<CircuitBreaker> {
		// Fast path: check if breaker exists
		if let Some(breaker) = self.breakers.read().await.get(service) {
			return breaker.clone();
		}

		// Slow path: create under the write lock
		let mut breakers = self.breakers.write().await;
		// Double-check: another task might have created it
		if let Some(breaker) = breakers.get(service) {
			return breaker.clone();
		}

		let breaker = Arc::new(CircuitBreaker::new(service, self.settings.clone()));
		breakers.insert(service.to_string(), breaker.clone());
		breaker
	}

	/// Runs `op` through the breaker for `service`.
	pub async fn execute<T, E, F, Fut>(&self, service: &str, op: F) -> Result<T, BreakerError<E>>
	where
		E: std::error::Error + 'static,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		self.get_or_create(service).await.execute(op).await
	}

	/// Snapshot of one service's breaker, if it exists.
	pub async fn snapshot(&self, service: &str) -> Option<CircuitBreakerSnapshot> {
		let breaker = self.breakers.read().await.get(service).cloned()?;
		Some(breaker.snapshot().await)
	}

	/// Snapshots of all known breakers, sorted by service name.
	pub async fn snapshot_all(&self) -> Vec<CircuitBreakerSnapshot> {
		let breakers: Vec<Arc<CircuitBreaker>> =
			self.breakers.read().await.values().cloned().collect();
		let mut snapshots = Vec::with_capacity(breakers.len());
		for breaker in breakers {
			snapshots.push(breaker.snapshot().await);
		}
		snapshots.sort_by(|a, b| a.service.cmp(&b.service));
		snapshots
	}

	/// Manually resets one service's breaker. Returns false if unknown.
	pub async fn reset(&self, service: &str) -> bool {
		let breaker = self.breakers.read().await.get(service).cloned();
		match breaker {
			Some(breaker) => {
				breaker.reset().await;
				true
			}
			None => false,
		}
	}

	/// Manually resets every known breaker.
	pub async fn reset_all(&self) {
		let breakers: Vec<Arc<CircuitBreaker>> =
			self.breakers.read().await.values().cloned().collect();
		for breaker in breakers {
			breaker.reset().await;
		}
	}
}
