//! Exponential-backoff retry policy and combinator.
//!
//! Every retrying call site in the workspace (endpoint sweeps, whole-action
//! attempt loops) goes through the same policy: a bounded number of
//! attempts with a delay of `base_delay * 2^attempt` between them. The
//! receipt waiter shares the policy type but keeps its own loop, because it
//! distinguishes "not yet mined" from transport failures.

use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of attempts, including the first.
	pub max_attempts: u32,
	/// Delay before the second attempt; doubles with each retry.
	pub base_delay: Duration,
}

impl RetryPolicy {
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
		}
	}

	/// Delay slept after the failed zero-based `attempt`.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		self.base_delay
			.saturating_mul(2u32.saturating_pow(attempt))
	}
}

/// Runs `op` until it succeeds or the policy is exhausted.
///
/// The closure receives the zero-based attempt number. The last error is
/// returned when all attempts fail; no delay is slept after the final
/// attempt.
pub async fn retry_with_backoff<T, E, F, Fut>(
	policy: &RetryPolicy,
	label: &str,
	mut op: F,
) -> Result<T, E>
where
	E: std::fmt::Display,
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 0;
	loop {
		match op(attempt).await {
			Ok(value) => return Ok(value),
			Err(error) => {
				attempt += 1;
				if attempt >= policy.max_attempts.max(1) {
					return Err(error);
				}
				let delay = policy.delay_for(attempt - 1);
				tracing::warn!(
					%error,
					attempt,
					max_attempts = policy.max_attempts,
					delay_ms = delay.as_millis() as u64,
					"{} failed, retrying",
					label
				);
				tokio::time::sleep(delay).await;
			}
		}
	}
}
