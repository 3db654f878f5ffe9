//! Liquidity additions through the position manager.

use crate::abi;
use crate::actions::{amount_in_units, unix_now, ActionError, ActionOutcome};
use crate::session::WalletSession;
use alloy_primitives::aliases::{I24, U24};
use alloy_sol_types::SolCall;
use farmer_config::LiquidityPairConfig;
use farmer_types::{Transaction, U256};
use rand::seq::SliceRandom;

/// Seconds until a submitted mint expires.
const LIQUIDITY_DEADLINE_SECS: u64 = 600;

/// Fixed wide tick range for every position.
const TICK_LOWER: i32 = -60_000;
const TICK_UPPER: i32 = 60_000;

impl WalletSession {
	/// Mints a position for a random configured pair. Runs at most once
	/// per iteration.
	pub async fn add_liquidity(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		let pair = self
			.pick_liquidity_pair()
			.ok_or(ActionError::EmptyPairTable("liquidity"))?;
		let token0 = self.token(&pair.token0)?;
		let token1 = self.token(&pair.token1)?;
		let amount0 = amount_in_units(&pair.amount0, token0.decimals)?;
		let amount1 = amount_in_units(&pair.amount1, token1.decimals)?;

		tracing::info!(
			iteration = index + 1,
			token0 = pair.token0.as_str(),
			token1 = pair.token1.as_str(),
			amount0 = pair.amount0.as_str(),
			amount1 = pair.amount1.as_str(),
			"preparing liquidity addition"
		);

		let position_manager = self.config.contracts.position_manager;

		if !self.check_balance(Some(token0), amount0).await? {
			return Ok(ActionOutcome::Skipped);
		}
		self.ensure_allowance(token0, position_manager, amount0)
			.await?;

		if !self.check_balance(Some(token1), amount1).await? {
			return Ok(ActionOutcome::Skipped);
		}
		self.ensure_allowance(token1, position_manager, amount1)
			.await?;

		let fee = U24::try_from(pair.fee)
			.map_err(|_| ActionError::Encoding(format!("fee tier {} exceeds uint24", pair.fee)))?;
		let tick_lower = I24::try_from(TICK_LOWER)
			.map_err(|_| ActionError::Encoding("tick below int24 range".to_string()))?;
		let tick_upper = I24::try_from(TICK_UPPER)
			.map_err(|_| ActionError::Encoding("tick above int24 range".to_string()))?;

		let data = abi::INonfungiblePositionManager::mintCall {
			params: abi::MintParams {
				token0: token0.address,
				token1: token1.address,
				fee,
				tickLower: tick_lower,
				tickUpper: tick_upper,
				amount0Desired: amount0,
				amount1Desired: amount1,
				amount0Min: U256::ZERO,
				amount1Min: U256::ZERO,
				recipient: self.wallet.address(),
				deadline: U256::from(unix_now() + LIQUIDITY_DEADLINE_SECS),
			},
		}
		.abi_encode();

		let pending = self
			.chain
			.send(Transaction::call(position_manager, data))
			.await?;
		tracing::info!(hash = %pending.hash, "liquidity addition submitted, awaiting confirmation");
		let receipt = self.chain.wait_for_receipt(&pending).await?;

		self.verify_transaction(&receipt).await;
		Ok(ActionOutcome::Confirmed(receipt))
	}

	fn pick_liquidity_pair(&self) -> Option<LiquidityPairConfig> {
		let mut rng = rand::thread_rng();
		self.config.liquidity.pairs.choose(&mut rng).cloned()
	}
}
