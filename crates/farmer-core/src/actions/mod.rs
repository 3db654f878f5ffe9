//! Action executors.
//!
//! One module per business action. Every executor follows the same shape:
//! check preconditions, build parameters, submit through the chain
//! service, await the receipt, then report the transaction for task
//! credit. Failed preconditions are skips, not errors, and no executor
//! failure escapes the per-wallet cycle.

use crate::abi;
use crate::session::WalletSession;
use alloy_sol_types::SolCall;
use farmer_account::AccountError;
use farmer_chain::ChainError;
use farmer_points::PointsError;
use farmer_types::{format_amount, parse_amount, Address, TokenConfig, Transaction, TransactionReceipt, U256};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub mod checkin;
pub mod faucet;
pub mod liquidity;
pub mod swap;
pub mod transfer;
pub mod wrap;

/// Errors that can occur while executing an action.
#[derive(Debug, Error)]
pub enum ActionError {
	/// The approval transaction failed or timed out.
	#[error("approval failed: {0}")]
	Approval(String),
	#[error(transparent)]
	Chain(#[from] ChainError),
	#[error(transparent)]
	Points(#[from] PointsError),
	#[error(transparent)]
	Account(#[from] AccountError),
	/// A configured amount could not be converted to token units.
	#[error("invalid amount '{amount}': {reason}")]
	Amount { amount: String, reason: String },
	/// A pair table referenced a token that is not configured.
	#[error("token '{0}' is not configured")]
	UnknownToken(String),
	/// The configured pair table is empty.
	#[error("no {0} pairs configured")]
	EmptyPairTable(&'static str),
	/// Call data construction failed.
	#[error("calldata encoding failed: {0}")]
	Encoding(String),
}

/// Result of one action iteration.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
	/// An on-chain action that reached a receipt.
	Confirmed(TransactionReceipt),
	/// An off-chain action that completed.
	Done,
	/// A precondition was unmet; nothing was submitted.
	Skipped,
}

/// Current Unix timestamp in seconds.
pub(crate) fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Parses a configured decimal amount into token units.
pub(crate) fn amount_in_units(amount: &str, decimals: u8) -> Result<U256, ActionError> {
	parse_amount(amount, decimals).map_err(|e| ActionError::Amount {
		amount: amount.to_string(),
		reason: e.to_string(),
	})
}

/// Draws a uniform amount from `[min, max)`; a degenerate range yields
/// `min`.
pub(crate) fn random_amount_between(min: U256, max: U256) -> Result<U256, ActionError> {
	if max <= min {
		return Ok(min);
	}
	let span: u128 = (max - min)
		.try_into()
		.map_err(|_| ActionError::Encoding("amount range exceeds u128".to_string()))?;
	let offset = rand::thread_rng().gen_range(0..span);
	Ok(min + U256::from(offset))
}

impl WalletSession {
	/// Looks up a configured token by symbol.
	pub(crate) fn token(&self, symbol: &str) -> Result<&TokenConfig, ActionError> {
		self.config
			.token(symbol)
			.ok_or_else(|| ActionError::UnknownToken(symbol.to_string()))
	}

	/// Checks that the wallet holds at least `required` of the given token
	/// (native when `token` is `None`), logging a warning otherwise.
	pub(crate) async fn check_balance(
		&self,
		token: Option<&TokenConfig>,
		required: U256,
	) -> Result<bool, ActionError> {
		let symbol = token
			.map(|t| t.symbol.as_str())
			.unwrap_or(self.config.network.currency_symbol.as_str());
		let decimals = token.map(|t| t.decimals).unwrap_or(18);

		let balance = self
			.chain
			.get_balance(self.wallet.address(), token.map(|t| t.address))
			.await?;

		if balance < required {
			tracing::warn!(
				token = symbol,
				balance = %format_amount(balance, decimals),
				required = %format_amount(required, decimals),
				"skipping action, insufficient balance"
			);
			return Ok(false);
		}
		Ok(true)
	}

	/// Grants `spender` an unlimited allowance when the current one does
	/// not cover `amount`.
	///
	/// The approval is itself a full submit-and-confirm round through the
	/// receipt waiter; any failure in it maps to [`ActionError::Approval`].
	pub(crate) async fn ensure_allowance(
		&self,
		token: &TokenConfig,
		spender: Address,
		amount: U256,
	) -> Result<(), ActionError> {
		let owner = self.wallet.address();
		let allowance = self
			.chain
			.get_allowance(owner, spender, token.address)
			.await?;
		if allowance >= amount {
			return Ok(());
		}

		tracing::info!(
			token = token.symbol.as_str(),
			%spender,
			"granting unlimited allowance"
		);

		let data = abi::IERC20::approveCall {
			spender,
			amount: U256::MAX,
		}
		.abi_encode();
		let tx = Transaction::call(token.address, data);

		let pending = self
			.chain
			.send(tx)
			.await
			.map_err(|e| ActionError::Approval(e.to_string()))?;
		let receipt = self
			.chain
			.wait_for_receipt(&pending)
			.await
			.map_err(|e| ActionError::Approval(e.to_string()))?;

		if !receipt.success {
			return Err(ActionError::Approval(format!(
				"approval transaction {} reverted",
				receipt.hash
			)));
		}

		tracing::info!(token = token.symbol.as_str(), "allowance confirmed");
		Ok(())
	}
}
