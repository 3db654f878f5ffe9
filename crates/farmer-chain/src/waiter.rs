//! Receipt polling with bounded exponential backoff.
//!
//! Turning a submitted transaction into a receipt is the only place the
//! bot tolerates repeated failure: testnet endpoints routinely lag behind
//! their own mempool and intermittently answer with the "resource
//! temporarily unavailable" error class. Both conditions are retried under
//! the same schedule; everything else propagates immediately.

use crate::{ChainError, ChainInterface};
use farmer_types::{RetryPolicy, TransactionReceipt, TxHash};

/// Polls for the receipt of `hash` until it appears or the policy is
/// exhausted.
///
/// Attempt `k` (zero-based) sleeps `base_delay * 2^k` after a missing
/// receipt or a transient RPC error. A non-transient read error is fatal
/// and returned as-is. Exhaustion yields
/// [`ChainError::ConfirmationTimeout`] carrying the hash.
pub async fn wait_for_receipt(
	chain: &dyn ChainInterface,
	hash: TxHash,
	policy: &RetryPolicy,
) -> Result<TransactionReceipt, ChainError> {
	for attempt in 0..policy.max_attempts {
		match chain.get_receipt(hash).await {
			Ok(Some(receipt)) => return Ok(receipt),
			Ok(None) => {
				tracing::debug!(
					%hash,
					attempt = attempt + 1,
					max_attempts = policy.max_attempts,
					"receipt not yet available"
				);
			}
			Err(error) if error.is_transient() => {
				tracing::warn!(
					%hash,
					attempt = attempt + 1,
					max_attempts = policy.max_attempts,
					%error,
					"transient RPC error while polling receipt"
				);
			}
			Err(error) => return Err(error),
		}
		tokio::time::sleep(policy.delay_for(attempt)).await;
	}

	Err(ChainError::ConfirmationTimeout {
		hash,
		attempts: policy.max_attempts,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::MockChain;
	use crate::TRANSIENT_RPC_CODE;
	use std::sync::atomic::Ordering;
	use std::time::Duration;

	fn policy() -> RetryPolicy {
		RetryPolicy::new(5, Duration::from_millis(1000))
	}

	fn receipt() -> TransactionReceipt {
		TransactionReceipt {
			hash: TxHash::ZERO,
			block_number: 42,
			success: true,
		}
	}

	fn transient() -> ChainError {
		ChainError::Rpc {
			code: Some(TRANSIENT_RPC_CODE),
			message: "resource temporarily unavailable".to_string(),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn exhausts_all_attempts_when_receipt_never_appears() {
		let chain = MockChain::default();
		let started = tokio::time::Instant::now();

		let result = wait_for_receipt(&chain, TxHash::ZERO, &policy()).await;

		assert!(matches!(
			result,
			Err(ChainError::ConfirmationTimeout { attempts: 5, .. })
		));
		assert_eq!(chain.receipt_calls.load(Ordering::SeqCst), 5);
		// 1 + 2 + 4 + 8 + 16 seconds of backoff.
		assert_eq!(started.elapsed(), Duration::from_millis(31_000));
	}

	#[tokio::test(start_paused = true)]
	async fn returns_as_soon_as_the_receipt_appears() {
		let chain = MockChain::receipts([Ok(None), Ok(None), Ok(None), Ok(Some(receipt()))]);
		let started = tokio::time::Instant::now();

		let result = wait_for_receipt(&chain, TxHash::ZERO, &policy()).await.unwrap();

		assert_eq!(result.block_number, 42);
		// Three failed polls plus the successful one, nothing further.
		assert_eq!(chain.receipt_calls.load(Ordering::SeqCst), 4);
		// 1000 + 2000 + 4000 ms of cumulative backoff.
		assert_eq!(started.elapsed(), Duration::from_millis(7_000));
	}

	#[tokio::test(start_paused = true)]
	async fn immediate_receipt_needs_a_single_poll() {
		let chain = MockChain::receipts([Ok(Some(receipt()))]);
		let started = tokio::time::Instant::now();

		wait_for_receipt(&chain, TxHash::ZERO, &policy()).await.unwrap();

		assert_eq!(chain.receipt_calls.load(Ordering::SeqCst), 1);
		assert_eq!(started.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn transient_errors_retry_like_missing_receipts() {
		let chain = MockChain::receipts([Err(transient()), Err(transient()), Ok(Some(receipt()))]);

		let result = wait_for_receipt(&chain, TxHash::ZERO, &policy()).await;

		assert!(result.is_ok());
		assert_eq!(chain.receipt_calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn fatal_errors_propagate_without_retry() {
		let chain = MockChain::receipts([Err(ChainError::Rpc {
			code: Some(-32000),
			message: "header not found".to_string(),
		})]);
		let started = tokio::time::Instant::now();

		let result = wait_for_receipt(&chain, TxHash::ZERO, &policy()).await;

		assert!(matches!(result, Err(ChainError::Rpc { code: Some(-32000), .. })));
		assert_eq!(chain.receipt_calls.load(Ordering::SeqCst), 1);
		assert_eq!(started.elapsed(), Duration::ZERO);
	}
}
