//! Circuit breaker state machine properties under arbitrary outcome
//! sequences.

use proptest::prelude::*;

use stakescan_rpc::{
	models::BreakerSettings,
	services::{
		breaker::{CircuitBreaker, CircuitStatus},
		transport::TransportError,
	},
};

const THRESHOLD: u32 = 3;

fn settings() -> BreakerSettings {
	BreakerSettings {
		failure_threshold: THRESHOLD,
		// Long enough that no cooldown elapses within a test run
		cooldown_ms: 600_000,
		probe_successes: 1,
	}
}

async fn drive(breaker: &CircuitBreaker, ok: bool) {
	let _ = breaker
		.execute(|| async move {
			if ok {
				Ok(())
			} else {
				Err(TransportError::network("getblockcount", "refused"))
			}
		})
		.await;
}

proptest! {
	#[test]
	fn prop_closed_consecutive_failures_stay_below_threshold(
		outcomes in prop::collection::vec(any::<bool>(), 1..40),
	) {
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_time()
			.build()
			.unwrap();
		rt.block_on(async {
			let breaker = CircuitBreaker::new("svc", settings());
			for &ok in &outcomes {
				drive(&breaker, ok).await;
				let snapshot = breaker.snapshot().await;
				match snapshot.status {
					CircuitStatus::Closed => {
						prop_assert!(snapshot.consecutive_failures < THRESHOLD)
					}
					CircuitStatus::Open => {
						prop_assert!(snapshot.opened_at.is_some());
						prop_assert!(snapshot.next_probe_at.is_some());
					}
					// No cooldown elapses within the run
					CircuitStatus::HalfOpen => prop_assert!(false, "unexpected half-open"),
				}
			}
			Ok(())
		})?;
	}

	#[test]
	fn prop_every_call_is_accounted_for(
		outcomes in prop::collection::vec(any::<bool>(), 1..40),
	) {
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_time()
			.build()
			.unwrap();
		rt.block_on(async {
			let breaker = CircuitBreaker::new("svc", settings());
			for &ok in &outcomes {
				drive(&breaker, ok).await;
			}
			let snapshot = breaker.snapshot().await;
			let accounted =
				snapshot.total_successes + snapshot.total_failures + snapshot.total_rejections;
			prop_assert_eq!(accounted, outcomes.len() as u64);
			Ok(())
		})?;
	}

	#[test]
	fn prop_open_circuit_rejects_without_invoking_operations(
		tail_calls in 1usize..20,
	) {
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_time()
			.build()
			.unwrap();
		rt.block_on(async {
			let breaker = CircuitBreaker::new("svc", settings());
			for _ in 0..THRESHOLD {
				drive(&breaker, false).await;
			}
			for _ in 0..tail_calls {
				drive(&breaker, true).await;
			}
			let snapshot = breaker.snapshot().await;
			prop_assert_eq!(snapshot.status, CircuitStatus::Open);
			// The successes never ran; they were rejected at the door
			prop_assert_eq!(snapshot.total_successes, 0);
			prop_assert_eq!(snapshot.total_rejections, tail_calls as u64);
			Ok(())
		})?;
	}
}
