//! Cache service tests driving the store failure paths through a mock
//! store. A broken store must never fail a caller's request.

use std::time::Duration;

use stakescan_rpc::services::cache::{CacheError, CacheService};

use crate::integration::mocks::MockStore;

#[tokio::test]
async fn test_store_read_failure_degrades_to_compute() {
	let mut store = MockStore::new();
	store
		.expect_get()
		.returning(|_| Err(CacheError::store_unavailable("connection refused")));
	store.expect_set().returning(|_, _, _| Ok(()));
	store.expect_entry_count().returning(|| Ok(0));

	let cache = CacheService::new(store);
	let value: u64 = cache
		.get_or_compute("chain:getblockcount", Duration::from_secs(30), || async {
			Ok::<_, std::convert::Infallible>(450_000)
		})
		.await
		.unwrap();

	assert_eq!(value, 450_000);
	let stats = cache.stats().await;
	assert_eq!(stats.misses, 1);
	assert!(stats.store_errors >= 1);
}

#[tokio::test]
async fn test_store_write_failure_is_absorbed() {
	let mut store = MockStore::new();
	store.expect_get().returning(|_| Ok(None));
	store
		.expect_set()
		.returning(|_, _, _| Err(CacheError::store_unavailable("write failed")));

	let cache = CacheService::new(store);
	let value: u64 = cache
		.get_or_compute("chain:getblockcount", Duration::from_secs(30), || async {
			Ok::<_, std::convert::Infallible>(7)
		})
		.await
		.unwrap();

	assert_eq!(value, 7);
}

#[tokio::test]
async fn test_corrupt_entry_is_dropped_and_recomputed() {
	let mut store = MockStore::new();
	store
		.expect_get()
		.returning(|_| Ok(Some("{not valid json".to_string())));
	store.expect_delete().returning(|_| Ok(true));
	store.expect_set().returning(|_, _, _| Ok(()));

	let cache = CacheService::new(store);
	let value: u64 = cache
		.get_or_compute("chain:getblockcount", Duration::from_secs(30), || async {
			Ok::<_, std::convert::Infallible>(9)
		})
		.await
		.unwrap();

	assert_eq!(value, 9);
}

#[tokio::test]
async fn test_delete_failure_reports_nothing_removed() {
	let mut store = MockStore::new();
	store
		.expect_delete()
		.returning(|_| Err(CacheError::store_unavailable("down")));
	store
		.expect_delete_prefix()
		.returning(|_| Err(CacheError::store_unavailable("down")));

	let cache = CacheService::new(store);
	assert!(!cache.invalidate("block:getblock:00aa").await);
	assert_eq!(cache.invalidate_prefix("block:").await, 0);
}
