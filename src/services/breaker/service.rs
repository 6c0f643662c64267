//! Per-service circuit breaker state machine.
//!
//! Shields the rest of the system from a persistently failing backend.
//! Three states: Closed (normal), Open (fail fast) and HalfOpen (probing).
//! The Open -> HalfOpen transition is lazy: it happens on the next call
//! attempt once the cooldown has elapsed, never via a timer.

use std::{
	future::Future,
	time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
	models::BreakerSettings,
	services::breaker::{BreakerError, CircuitOpenError},
};

/// Breaker state machine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStatus {
	Closed,
	Open,
	HalfOpen,
}

/// Serializable view of one breaker's state, exposed to admin surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSnapshot {
	pub service: String,
	pub status: CircuitStatus,
	pub consecutive_failures: u32,
	pub opened_at: Option<DateTime<Utc>>,
	pub next_probe_at: Option<DateTime<Utc>>,
	pub total_successes: u64,
	pub total_failures: u64,
	pub total_rejections: u64,
}

/// Mutable state, all guarded by one lock so transitions are atomic.
#[derive(Debug)]
struct BreakerState {
	status: CircuitStatus,
	consecutive_failures: u32,
	probe_successes: u32,
	opened_at: Option<Instant>,
	opened_at_utc: Option<DateTime<Utc>>,
	total_successes: u64,
	total_failures: u64,
	total_rejections: u64,
}

impl BreakerState {
	fn new() -> Self {
		Self {
			status: CircuitStatus::Closed,
			consecutive_failures: 0,
			probe_successes: 0,
			opened_at: None,
			opened_at_utc: None,
			total_successes: 0,
			total_failures: 0,
			total_rejections: 0,
		}
	}
}

/// Circuit breaker for one named service.
///
/// Transitions:
/// - Closed -> Open after `failure_threshold` consecutive failures
/// - Open -> HalfOpen once the cooldown elapses (checked lazily)
/// - HalfOpen -> Closed after `probe_successes` consecutive probe successes
/// - HalfOpen -> Open on any probe failure, with a fresh cooldown
pub struct CircuitBreaker {
	name: String,
	settings: BreakerSettings,
	state: Mutex<BreakerState>,
}

impl CircuitBreaker {
	pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
		Self {
			name: name.into(),
			settings,
			state: Mutex::new(BreakerState::new()),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Runs `op` through the breaker.
	///
	/// Fails fast with [`CircuitOpenError`] when the breaker is open and
	/// the cooldown has not elapsed; otherwise invokes `op`, records the
	/// outcome, and re-raises the operation's own error on failure.
	pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
	where
		E: std::error::Error + 'static,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		self.try_acquire().await?;

		match op().await {
			Ok(value) => {
				self.record_success().await;
				Ok(value)
			}
			Err(error) => {
				self.record_failure().await;
				Err(BreakerError::Inner(error))
			}
		}
	}

	/// Checks whether a call may proceed, lazily transitioning an open
	/// breaker to half-open when the cooldown has elapsed.
	pub async fn try_acquire(&self) -> Result<(), CircuitOpenError> {
		let mut state = self.state.lock().await;
		match state.status {
			CircuitStatus::Closed | CircuitStatus::HalfOpen => Ok(()),
			CircuitStatus::Open => {
				let elapsed = state
					.opened_at
					.map(|opened| opened.elapsed())
					.unwrap_or(Duration::MAX);
				let cooldown = self.settings.cooldown();
				if elapsed >= cooldown {
					state.status = CircuitStatus::HalfOpen;
					state.probe_successes = 0;
					debug!(service = self.name, "circuit half-open, probing");
					Ok(())
				} else {
					state.total_rejections += 1;
					Err(CircuitOpenError {
						service: self.name.clone(),
						cooldown_remaining: cooldown - elapsed,
					})
				}
			}
		}
	}

	/// Records a successful call outcome.
	pub async fn record_success(&self) {
		let mut state = self.state.lock().await;
		state.total_successes += 1;
		match state.status {
			CircuitStatus::Closed => {
				state.consecutive_failures = 0;
			}
			CircuitStatus::HalfOpen => {
				state.probe_successes += 1;
				if state.probe_successes >= self.settings.probe_successes {
					state.status = CircuitStatus::Closed;
					state.consecutive_failures = 0;
					state.probe_successes = 0;
					state.opened_at = None;
					state.opened_at_utc = None;
					debug!(service = self.name, "circuit closed");
				}
			}
			// Stale outcome from a call admitted before the breaker opened
			CircuitStatus::Open => {}
		}
	}

	/// Records a failed call outcome.
	pub async fn record_failure(&self) {
		let mut state = self.state.lock().await;
		state.total_failures += 1;
		match state.status {
			CircuitStatus::Closed => {
				state.consecutive_failures += 1;
				if state.consecutive_failures >= self.settings.failure_threshold {
					Self::open(&mut state);
					warn!(
						service = self.name,
						failures = state.consecutive_failures,
						"circuit opened"
					);
				}
			}
			// Any probe failure re-opens with a fresh cooldown clock
			CircuitStatus::HalfOpen => {
				state.consecutive_failures += 1;
				Self::open(&mut state);
				warn!(service = self.name, "probe failed, circuit re-opened");
			}
			CircuitStatus::Open => {
				state.consecutive_failures += 1;
			}
		}
	}

	fn open(state: &mut BreakerState) {
		state.status = CircuitStatus::Open;
		state.probe_successes = 0;
		state.opened_at = Some(Instant::now());
		state.opened_at_utc = Some(Utc::now());
	}

	/// Current status, without side effects.
	pub async fn status(&self) -> CircuitStatus {
		self.state.lock().await.status
	}

	/// Serializable snapshot of the breaker's state.
	pub async fn snapshot(&self) -> CircuitBreakerSnapshot {
		let state = self.state.lock().await;
		let next_probe_at = state.opened_at_utc.map(|opened| {
			opened + chrono::Duration::milliseconds(self.settings.cooldown_ms as i64)
		});
		CircuitBreakerSnapshot {
			service: self.name.clone(),
			status: state.status,
			consecutive_failures: state.consecutive_failures,
			opened_at: state.opened_at_utc,
			next_probe_at,
			total_successes: state.total_successes,
			total_failures: state.total_failures,
			total_rejections: state.total_rejections,
		}
	}

	/// Manually resets the breaker to closed, clearing all counters.
	pub async fn reset(&self) {
		let mut state = self.state.lock().await;
		*state = BreakerState::new();
		debug!(service = self.name, "circuit manually reset");
	}
}
