//! Per-wallet execution session.
//!
//! A [`WalletSession`] owns everything one wallet needs for one cycle: its
//! signer, a chain service bound to that signer, a reward-service client,
//! and the session token captured at check-in. Sessions run their actions
//! strictly in sequence; there is never more than one in-flight
//! transaction per wallet.

use crate::actions::{ActionError, ActionOutcome};
use farmer_account::Wallet;
use farmer_chain::ChainService;
use farmer_config::Config;
use farmer_points::{PointsInterface, SessionToken};
use farmer_types::{RetryPolicy, TransactionReceipt};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Base delay of the outer per-action attempt loop.
const ATTEMPT_BASE_DELAY: Duration = Duration::from_secs(1);

pub struct WalletSession {
	pub(crate) wallet: Wallet,
	pub(crate) chain: ChainService,
	pub(crate) points: Arc<dyn PointsInterface>,
	pub(crate) config: Arc<Config>,
	/// Token captured at check-in, reused for profile reads and task
	/// verification.
	pub(crate) session_token: Option<SessionToken>,
}

impl WalletSession {
	pub fn new(
		wallet: Wallet,
		chain: ChainService,
		points: Arc<dyn PointsInterface>,
		config: Arc<Config>,
	) -> Self {
		Self {
			wallet,
			chain,
			points,
			config,
			session_token: None,
		}
	}

	/// Runs the wallet's full action sequence.
	///
	/// Every step is isolated: a failing action is logged and the
	/// sequence moves on. This method never fails; wallet-level errors
	/// stay inside the wallet.
	pub async fn run_cycle(&mut self) {
		let address = self.wallet.address();
		let span = tracing::info_span!("wallet", %address);

		async {
			tracing::info!("starting wallet cycle");

			if let Err(error) = self.claim_faucet().await {
				tracing::error!(%error, "faucet claim failed");
			}

			if let Err(error) = self.check_in().await {
				tracing::error!(%error, "check-in failed");
			}

			self.log_profile().await;

			let actions = self.config.actions.clone();
			for index in 0..actions.transfers_per_cycle {
				let result = self.transfer(index).await;
				self.report("transfer", index, result);
				self.pause().await;
			}
			for index in 0..actions.wraps_per_cycle {
				let result = self.wrap(index).await;
				self.report("wrap", index, result);
				self.pause().await;
			}
			for index in 0..actions.swaps_per_cycle {
				let result = self.swap(index).await;
				self.report("swap", index, result);
				self.pause().await;
			}
			for index in 0..actions.liquidity_per_cycle {
				let result = self.add_liquidity(index).await;
				self.report("liquidity", index, result);
				self.pause().await;
			}

			tracing::info!("wallet cycle complete");
		}
		.instrument(span)
		.await
	}

	/// Outer attempt policy shared by the retryable actions.
	pub(crate) fn attempt_policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.config.bot.action_attempts, ATTEMPT_BASE_DELAY)
	}

	/// Reports a confirmed transaction to the reward service for task
	/// credit. Verification failures are logged, never propagated: the
	/// on-chain action already succeeded.
	pub(crate) async fn verify_transaction(&self, receipt: &TransactionReceipt) {
		let Some(token) = &self.session_token else {
			tracing::warn!("skipping task verification, no session token");
			return;
		};

		match self
			.points
			.verify_task(
				token,
				self.wallet.address(),
				receipt.hash,
				self.config.points.verify_task_id,
			)
			.await
		{
			Ok(true) => tracing::info!(hash = %receipt.hash, "task verified"),
			Ok(false) => tracing::warn!(hash = %receipt.hash, "task verification declined"),
			Err(error) => tracing::warn!(%error, "task verification failed"),
		}
	}

	async fn log_profile(&self) {
		let Some(token) = &self.session_token else {
			tracing::warn!("skipping profile fetch, no session token");
			return;
		};

		match self.points.profile(token, self.wallet.address()).await {
			Ok(profile) => tracing::info!(
				user_id = profile.user_id,
				task_points = profile.task_points,
				total_points = profile.total_points,
				"points standing"
			),
			Err(error) => tracing::warn!(%error, "profile fetch failed"),
		}
	}

	fn report(&self, label: &str, index: u32, result: Result<ActionOutcome, ActionError>) {
		match result {
			Ok(ActionOutcome::Confirmed(receipt)) => {
				if receipt.success {
					tracing::info!(
						action = label,
						iteration = index + 1,
						hash = %receipt.hash,
						block = receipt.block_number,
						"action confirmed"
					);
				} else {
					tracing::error!(
						action = label,
						iteration = index + 1,
						hash = %receipt.hash,
						"transaction reverted"
					);
				}
				if let Some(explorer) = &self.config.network.explorer_url {
					tracing::info!("{}/tx/{}", explorer.trim_end_matches('/'), receipt.hash);
				}
			}
			Ok(ActionOutcome::Done) => {
				tracing::info!(action = label, iteration = index + 1, "action completed")
			}
			// The skip was already reported at the precondition site.
			Ok(ActionOutcome::Skipped) => {}
			Err(error) => tracing::error!(
				action = label,
				iteration = index + 1,
				%error,
				"action failed"
			),
		}
	}

	/// Random pause between iterations of the same action.
	async fn pause(&self) {
		let min = self.config.bot.min_action_delay_ms;
		let max = self.config.bot.max_action_delay_ms;
		let delay = if max > min {
			rand::thread_rng().gen_range(min..=max)
		} else {
			min
		};
		tokio::time::sleep(Duration::from_millis(delay)).await;
	}
}
