use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use std::time::Duration;

/// Configuration for HTTP retry policies
///
/// The default allows a single retry, matching the transport contract of
/// one automatic retry for idempotent read methods on connection-class
/// failures.
#[derive(Debug, Clone)]
pub struct HttpRetryConfig {
	/// Maximum number of retries for transient errors
	pub max_retries: u32,
	/// Base duration for exponential backoff calculations
	pub base_for_backoff: u32,
	/// Initial backoff duration before the first retry
	pub initial_backoff: Duration,
	/// Maximum backoff duration for retries
	pub max_backoff: Duration,
	/// Jitter to apply to the backoff duration
	pub jitter: Jitter,
}

impl Default for HttpRetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 1,
			base_for_backoff: 2,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(5),
			jitter: Jitter::Full,
		}
	}
}

impl HttpRetryConfig {
	/// A configuration that never retries, used for non-idempotent methods.
	pub fn no_retries() -> Self {
		Self {
			max_retries: 0,
			..Default::default()
		}
	}
}

/// Wraps a base HTTP client with retry middleware.
///
/// # Parameters:
/// - `config`: Configuration for retry policies
/// - `base_client`: The base HTTP client to use
/// - `custom_strategy`: Optional custom retry strategy, complementing the default retry behavior
///
/// # Returns
/// A `ClientWithMiddleware` that includes retry capabilities
pub fn create_retryable_http_client<S>(
	config: &HttpRetryConfig,
	base_client: reqwest::Client,
	custom_strategy: Option<S>,
) -> ClientWithMiddleware
where
	S: RetryableStrategy + Send + Sync + 'static,
{
	let retry_policy = ExponentialBackoff::builder()
		.base(config.base_for_backoff)
		.retry_bounds(config.initial_backoff, config.max_backoff)
		.jitter(config.jitter)
		.build_with_max_retries(config.max_retries);

	if let Some(strategy) = custom_strategy {
		ClientBuilder::new(base_client).with(
			RetryTransientMiddleware::new_with_policy_and_strategy(retry_policy, strategy),
		)
	} else {
		ClientBuilder::new(base_client)
			.with(RetryTransientMiddleware::new_with_policy(retry_policy))
	}
	.build()
}
