//! Token swaps through the router's deadline multicall.

use crate::abi;
use crate::actions::{amount_in_units, unix_now, ActionError, ActionOutcome};
use crate::session::WalletSession;
use alloy_primitives::aliases::{U160, U24};
use alloy_sol_types::SolCall;
use farmer_config::SwapPairConfig;
use farmer_types::{retry_with_backoff, Transaction, U256};
use rand::seq::SliceRandom;

/// Seconds until a submitted swap expires.
const SWAP_DEADLINE_SECS: u64 = 300;

impl WalletSession {
	/// Swaps a random configured pair, retrying the whole attempt under
	/// the outer policy.
	pub async fn swap(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		retry_with_backoff(&self.attempt_policy(), "swap", |_| self.swap_once(index)).await
	}

	fn pick_swap_pair(&self) -> Option<SwapPairConfig> {
		let mut rng = rand::thread_rng();
		self.config.swap.pairs.choose(&mut rng).cloned()
	}

	async fn swap_once(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		let pair = self
			.pick_swap_pair()
			.ok_or(ActionError::EmptyPairTable("swap"))?;
		let token_in = self.token(&pair.from)?;
		let token_out = self.token(&pair.to)?;
		let amount = amount_in_units(&pair.amount, token_in.decimals)?;

		tracing::info!(
			iteration = index + 1,
			from = pair.from.as_str(),
			to = pair.to.as_str(),
			amount = pair.amount.as_str(),
			"preparing swap"
		);

		if !self.check_balance(Some(token_in), amount).await? {
			return Ok(ActionOutcome::Skipped);
		}

		let router = self.config.contracts.swap_router;
		self.ensure_allowance(token_in, router, amount).await?;

		let fee = U24::try_from(pair.fee)
			.map_err(|_| ActionError::Encoding(format!("fee tier {} exceeds uint24", pair.fee)))?;
		let swap_call = abi::ISwapRouter::exactInputSingleCall {
			params: abi::ExactInputSingleParams {
				tokenIn: token_in.address,
				tokenOut: token_out.address,
				fee,
				recipient: self.wallet.address(),
				amountIn: amount,
				amountOutMinimum: U256::ZERO,
				sqrtPriceLimitX96: U160::ZERO,
			},
		}
		.abi_encode();

		let deadline = U256::from(unix_now() + SWAP_DEADLINE_SECS);
		let data = abi::ISwapRouter::multicallCall {
			deadline,
			data: vec![swap_call.into()],
		}
		.abi_encode();

		let pending = self.chain.send(Transaction::call(router, data)).await?;
		tracing::info!(hash = %pending.hash, "swap submitted, awaiting confirmation");
		let receipt = self.chain.wait_for_receipt(&pending).await?;

		self.verify_transaction(&receipt).await;
		Ok(ActionOutcome::Confirmed(receipt))
	}
}
