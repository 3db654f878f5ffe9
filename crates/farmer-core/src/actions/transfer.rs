//! Native transfers to fresh random recipients.

use crate::actions::{amount_in_units, ActionError, ActionOutcome};
use crate::session::WalletSession;
use farmer_account::random_recipient;
use farmer_types::{format_amount, retry_with_backoff, Transaction};

/// Plain value transfers need no estimation.
const TRANSFER_GAS_LIMIT: u64 = 21_000;

impl WalletSession {
	/// Sends the configured amount to a fresh random address, retrying the
	/// whole attempt under the outer policy.
	pub async fn transfer(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		retry_with_backoff(&self.attempt_policy(), "transfer", |_| {
			self.transfer_once(index)
		})
		.await
	}

	async fn transfer_once(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		let amount = amount_in_units(&self.config.actions.transfer_amount, 18)?;
		let recipient = random_recipient();

		tracing::info!(
			iteration = index + 1,
			%recipient,
			amount = %format_amount(amount, 18),
			currency = self.config.network.currency_symbol.as_str(),
			"preparing transfer"
		);

		if !self.check_balance(None, amount).await? {
			return Ok(ActionOutcome::Skipped);
		}

		let mut tx = Transaction::transfer(recipient, amount);
		tx.gas_limit = Some(TRANSFER_GAS_LIMIT);

		let pending = self.chain.send(tx).await?;
		tracing::info!(hash = %pending.hash, "transfer submitted, awaiting confirmation");
		let receipt = self.chain.wait_for_receipt(&pending).await?;

		self.verify_transaction(&receipt).await;
		Ok(ActionOutcome::Confirmed(receipt))
	}
}

#[cfg(test)]
mod tests {
	use crate::testing::{session_with, MockChain, MockPoints};
	use crate::ActionOutcome;
	use farmer_points::SessionToken;
	use farmer_types::U256;
	use std::sync::atomic::Ordering;
	use std::sync::Arc;

	#[tokio::test(start_paused = true)]
	async fn skips_without_submitting_when_balance_is_short() {
		let chain = Arc::new(MockChain::default());
		let session = session_with(chain.clone(), Arc::new(MockPoints::default()));

		let outcome = session.transfer(0).await.unwrap();

		assert!(matches!(outcome, ActionOutcome::Skipped));
		assert_eq!(chain.submitted_count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn submits_with_fixed_gas_limit_and_verifies() {
		let chain = Arc::new(MockChain::default());
		chain.set_native_balance(U256::from(10u64).pow(U256::from(18u64)));
		let points = Arc::new(MockPoints::default());
		let mut session = session_with(chain.clone(), points.clone());
		session.session_token = Some(SessionToken::new("jwt".to_string()));

		let outcome = session.transfer(0).await.unwrap();

		assert!(matches!(outcome, ActionOutcome::Confirmed(_)));
		let submitted = chain.submitted.lock().unwrap();
		assert_eq!(submitted.len(), 1);
		assert_eq!(submitted[0].gas_limit, Some(21_000));
		// 0.000001 of the native currency.
		assert_eq!(submitted[0].value, U256::from(1_000_000_000_000u64));
		assert!(submitted[0].data.is_empty());
		drop(submitted);
		assert_eq!(points.verify_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn retries_the_whole_attempt_after_a_submit_failure() {
		let chain = Arc::new(MockChain::default());
		chain.set_native_balance(U256::from(10u64).pow(U256::from(18u64)));
		chain.fail_next_submits(1);
		let session = session_with(chain.clone(), Arc::new(MockPoints::default()));

		let outcome = session.transfer(0).await.unwrap();

		assert!(matches!(outcome, ActionOutcome::Confirmed(_)));
		assert_eq!(chain.submitted_count(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn gives_up_after_the_outer_attempts_are_exhausted() {
		let chain = Arc::new(MockChain::default());
		chain.set_native_balance(U256::from(10u64).pow(U256::from(18u64)));
		chain.fail_next_submits(10);
		let session = session_with(chain.clone(), Arc::new(MockPoints::default()));

		let result = session.transfer(0).await;

		assert!(result.is_err());
		// One submission per outer attempt.
		assert_eq!(chain.submitted_count(), 3);
	}
}
