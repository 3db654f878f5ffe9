//! Daily check-in; the only action whose session token outlives it.

use crate::actions::{ActionError, ActionOutcome};
use crate::session::WalletSession;
use farmer_points::{CheckInStatus, SessionToken};
use farmer_types::retry_with_backoff;

impl WalletSession {
	/// Logs in, performs the daily check-in, and keeps the session token
	/// for the rest of the cycle (profile reads and task verification).
	/// An "already checked in" answer is tolerated; the token is kept
	/// either way.
	pub async fn check_in(&mut self) -> Result<ActionOutcome, ActionError> {
		let policy = self.attempt_policy();
		let (token, status) =
			retry_with_backoff(&policy, "check-in", |_| self.check_in_once()).await?;

		if status.already_done {
			tracing::info!("already checked in for the current window");
		} else {
			tracing::info!("daily check-in recorded");
		}

		self.session_token = Some(token);
		Ok(ActionOutcome::Done)
	}

	async fn check_in_once(&self) -> Result<(SessionToken, CheckInStatus), ActionError> {
		let address = self.wallet.address();

		let signature = self
			.wallet
			.sign_message(&self.config.points.login_message)
			.await?;
		let token = self.points.login(address, &signature).await?;
		let status = self.points.check_in(&token, address).await?;

		Ok((token, status))
	}
}

#[cfg(test)]
mod tests {
	use crate::testing::{session_with, MockChain, MockPoints};
	use std::sync::atomic::Ordering;
	use std::sync::Arc;

	#[tokio::test(start_paused = true)]
	async fn stores_the_session_token() {
		let points = Arc::new(MockPoints::default());
		let mut session = session_with(Arc::new(MockChain::default()), points.clone());

		session.check_in().await.unwrap();

		assert!(session.session_token.is_some());
		assert_eq!(points.check_in_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn already_checked_in_is_not_an_error() {
		let points = Arc::new(MockPoints::already_checked_in());
		let mut session = session_with(Arc::new(MockChain::default()), points.clone());

		let result = session.check_in().await;

		assert!(result.is_ok());
		assert!(session.session_token.is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn login_rejection_fails_after_the_outer_attempts() {
		let points = Arc::new(MockPoints::rejecting_login());
		let mut session = session_with(Arc::new(MockChain::default()), points.clone());

		let result = session.check_in().await;

		assert!(result.is_err());
		assert!(session.session_token.is_none());
		// One login per outer attempt.
		assert_eq!(points.login_calls.load(Ordering::SeqCst), 3);
	}
}
