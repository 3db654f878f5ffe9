//! Transaction delivery types.
//!
//! Types produced and consumed around transaction submission: the pending
//! handle returned by a submission, the receipt observed once the
//! transaction is mined, and the fee data used to price it.

use alloy_primitives::TxHash;
use std::time::Instant;

/// Fallback legacy gas price (1 gwei) when the endpoint reports none.
pub const DEFAULT_GAS_PRICE: u128 = 1_000_000_000;

/// Handle for a submitted but not yet confirmed transaction.
///
/// Produced by submission, consumed by the confirmation waiter.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
	/// Hash under which the transaction was accepted by the endpoint.
	pub hash: TxHash,
	/// When the transaction was handed to the endpoint.
	pub submitted_at: Instant,
}

impl PendingTransaction {
	pub fn new(hash: TxHash) -> Self {
		Self {
			hash,
			submitted_at: Instant::now(),
		}
	}
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TxHash,
	/// The block the transaction was included in.
	pub block_number: u64,
	/// Whether execution succeeded.
	pub success: bool,
}

/// Current fee data of the network.
///
/// The legacy gas price is always present (falling back to
/// [`DEFAULT_GAS_PRICE`]); the EIP-1559 fields are only set when the
/// endpoint exposes fee history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeData {
	/// Legacy gas price in wei.
	pub gas_price: u128,
	/// EIP-1559 maximum fee per gas, when available.
	pub max_fee_per_gas: Option<u128>,
	/// EIP-1559 maximum priority fee per gas, when available.
	pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
	/// Fee data with only a legacy gas price.
	pub fn legacy(gas_price: u128) -> Self {
		Self {
			gas_price,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		}
	}
}

impl Default for FeeData {
	fn default() -> Self {
		Self::legacy(DEFAULT_GAS_PRICE)
	}
}
