//! Daily faucet claim.

use crate::actions::{ActionError, ActionOutcome};
use crate::session::WalletSession;
use farmer_types::retry_with_backoff;

impl WalletSession {
	/// Logs in with a fresh signature and claims the faucet when the
	/// wallet is eligible. Retries the whole attempt under the outer
	/// policy.
	pub async fn claim_faucet(&self) -> Result<ActionOutcome, ActionError> {
		retry_with_backoff(&self.attempt_policy(), "faucet claim", |_| {
			self.claim_faucet_once()
		})
		.await
	}

	async fn claim_faucet_once(&self) -> Result<ActionOutcome, ActionError> {
		let address = self.wallet.address();
		tracing::info!("checking faucet eligibility");

		let signature = self
			.wallet
			.sign_message(&self.config.points.login_message)
			.await?;
		let token = self.points.login(address, &signature).await?;

		let status = self.points.faucet_status(&token, address).await?;
		if !status.eligible {
			match status.next_eligible_at {
				Some(timestamp) => {
					tracing::warn!(next_eligible_at = timestamp, "faucet not yet available")
				}
				None => tracing::warn!("faucet not available"),
			}
			return Ok(ActionOutcome::Skipped);
		}

		self.points.claim_faucet(&token, address).await?;
		tracing::info!("faucet claim accepted");
		Ok(ActionOutcome::Done)
	}
}

#[cfg(test)]
mod tests {
	use crate::testing::{session_with, MockChain, MockPoints};
	use crate::ActionOutcome;
	use std::sync::atomic::Ordering;
	use std::sync::Arc;

	#[tokio::test(start_paused = true)]
	async fn claims_when_eligible() {
		let points = Arc::new(MockPoints::default());
		let session = session_with(Arc::new(MockChain::default()), points.clone());

		let outcome = session.claim_faucet().await.unwrap();

		assert!(matches!(outcome, ActionOutcome::Done));
		assert_eq!(points.login_calls.load(Ordering::SeqCst), 1);
		assert_eq!(points.claim_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn skips_the_claim_when_not_eligible() {
		let points = Arc::new(MockPoints::ineligible());
		let session = session_with(Arc::new(MockChain::default()), points.clone());

		let outcome = session.claim_faucet().await.unwrap();

		assert!(matches!(outcome, ActionOutcome::Skipped));
		assert_eq!(points.faucet_status_calls.load(Ordering::SeqCst), 1);
		assert_eq!(points.claim_calls.load(Ordering::SeqCst), 0);
	}
}
