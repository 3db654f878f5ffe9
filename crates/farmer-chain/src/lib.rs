//! Blockchain client for the pharos-farmer workspace.
//!
//! This crate owns everything that talks JSON-RPC: connecting to an
//! endpoint (optionally through a validated forward proxy), reading
//! balances and allowances, estimating gas, submitting transactions, and
//! waiting for receipts with bounded exponential backoff.

use async_trait::async_trait;
use farmer_types::{
	FeeData, PendingTransaction, RetryPolicy, Transaction, TransactionReceipt,
};
use farmer_types::{Address, TxHash, U256};
use std::sync::Arc;
use thiserror::Error;

pub mod evm;
pub mod proxy;
pub mod waiter;

pub use evm::AlloyChain;

/// JSON-RPC error code for the "resource temporarily unavailable" class.
///
/// The confirmation waiter treats this exactly like a not-yet-mined
/// transaction; every other RPC error is fatal to the read.
pub const TRANSIENT_RPC_CODE: i64 = -32008;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
	/// No RPC endpoint could be reached after all sweeps.
	#[error("no RPC endpoint reachable: {0}")]
	Connection(String),
	/// Gas estimation reverted; the action must not be submitted.
	#[error("gas estimation failed: {0}")]
	Estimation(String),
	/// The receipt never appeared within the bounded polling window.
	#[error("no receipt for transaction {hash} after {attempts} attempts")]
	ConfirmationTimeout { hash: TxHash, attempts: u32 },
	/// Any other RPC failure, carrying the server error code when present.
	#[error("RPC request failed: {message}")]
	Rpc { code: Option<i64>, message: String },
}

impl ChainError {
	/// Whether the error belongs to the transient class that is retried
	/// like a missing receipt.
	pub fn is_transient(&self) -> bool {
		matches!(
			self,
			ChainError::Rpc {
				code: Some(TRANSIENT_RPC_CODE),
				..
			}
		)
	}

	pub(crate) fn rpc(message: impl Into<String>) -> Self {
		ChainError::Rpc {
			code: None,
			message: message.into(),
		}
	}
}

/// Interface to a single EVM network, bound to one signing wallet.
///
/// The concrete implementation is [`AlloyChain`]; the trait exists so the
/// executors and the waiter can be exercised against scripted fakes.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Native balance when `token` is `None`, ERC-20 `balanceOf` otherwise.
	async fn get_balance(&self, address: Address, token: Option<Address>)
		-> Result<U256, ChainError>;

	/// ERC-20 `allowance(owner, spender)`.
	async fn get_allowance(
		&self,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError>;

	/// Simulates the transaction and returns its gas cost.
	///
	/// A reverting simulation yields [`ChainError::Estimation`].
	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, ChainError>;

	/// Current gas price and, when available, EIP-1559 fee estimates.
	async fn fee_data(&self) -> Result<FeeData, ChainError>;

	/// Signs and submits the transaction, returning its hash.
	async fn submit(&self, tx: Transaction) -> Result<TxHash, ChainError>;

	/// The receipt for `hash`, or `None` while the transaction is unmined.
	async fn get_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>, ChainError>;

	/// Latest block number.
	async fn get_block_number(&self) -> Result<u64, ChainError>;
}

/// Scales an estimated gas cost by the 1.2x safety margin applied to every
/// submission that did not pin its own gas limit.
pub fn with_gas_margin(estimated: u64) -> u64 {
	estimated.saturating_mul(12).div_ceil(10)
}

/// High-level chain service used by the action executors.
///
/// Wraps a [`ChainInterface`] with the submission policy (gas margin, fee
/// filling) and the receipt waiter.
pub struct ChainService {
	inner: Arc<dyn ChainInterface>,
	confirmation: RetryPolicy,
}

impl ChainService {
	pub fn new(inner: Arc<dyn ChainInterface>, confirmation: RetryPolicy) -> Self {
		Self {
			inner,
			confirmation,
		}
	}

	/// Prices and submits a transaction.
	///
	/// A missing gas limit is filled from estimation plus the safety
	/// margin; estimation failure aborts before anything is sent. Missing
	/// fee fields are filled from current fee data, preferring the
	/// EIP-1559 pair when the endpoint provides one.
	pub async fn send(&self, mut tx: Transaction) -> Result<PendingTransaction, ChainError> {
		if tx.gas_limit.is_none() {
			let estimated = self.inner.estimate_gas(&tx).await?;
			tx.gas_limit = Some(with_gas_margin(estimated));
		}

		if tx.gas_price.is_none() && tx.max_fee_per_gas.is_none() {
			let fees = self.inner.fee_data().await?;
			match (fees.max_fee_per_gas, fees.max_priority_fee_per_gas) {
				(Some(max_fee), Some(priority_fee)) => {
					tx.max_fee_per_gas = Some(max_fee);
					tx.max_priority_fee_per_gas = Some(priority_fee);
				}
				_ => tx.gas_price = Some(fees.gas_price),
			}
		}

		let hash = self.inner.submit(tx).await?;
		Ok(PendingTransaction::new(hash))
	}

	/// Waits for the receipt of a submitted transaction under the
	/// configured confirmation policy.
	pub async fn wait_for_receipt(
		&self,
		pending: &PendingTransaction,
	) -> Result<TransactionReceipt, ChainError> {
		let receipt =
			waiter::wait_for_receipt(self.inner.as_ref(), pending.hash, &self.confirmation).await?;
		tracing::debug!(
			hash = %pending.hash,
			elapsed_ms = pending.submitted_at.elapsed().as_millis() as u64,
			"receipt observed"
		);
		Ok(receipt)
	}

	pub async fn get_balance(
		&self,
		address: Address,
		token: Option<Address>,
	) -> Result<U256, ChainError> {
		self.inner.get_balance(address, token).await
	}

	pub async fn get_allowance(
		&self,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError> {
		self.inner.get_allowance(owner, spender, token).await
	}

	pub async fn get_block_number(&self) -> Result<u64, ChainError> {
		self.inner.get_block_number().await
	}
}
