//! Transaction request type.
//!
//! A chain-bound transaction before submission. Gas and fee fields are
//! optional; whatever the caller leaves unset is filled in at submission
//! time from estimation and current fee data.

use alloy_primitives::{Address, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};

/// A transaction to be priced, signed and submitted.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
	/// Recipient; `None` would deploy a contract (unused here).
	pub to: Option<Address>,
	/// Native value transferred with the call.
	pub value: U256,
	/// ABI-encoded call data.
	pub data: Vec<u8>,
	/// Gas limit; filled from estimation when unset.
	pub gas_limit: Option<u64>,
	/// Legacy gas price in wei.
	pub gas_price: Option<u128>,
	/// EIP-1559 maximum fee per gas.
	pub max_fee_per_gas: Option<u128>,
	/// EIP-1559 maximum priority fee per gas.
	pub max_priority_fee_per_gas: Option<u128>,
	/// Explicit nonce; filled by the provider when unset.
	pub nonce: Option<u64>,
}

impl Transaction {
	/// A contract call with no attached value.
	pub fn call(to: Address, data: Vec<u8>) -> Self {
		Self {
			to: Some(to),
			data,
			..Self::default()
		}
	}

	/// A contract call carrying native value.
	pub fn call_with_value(to: Address, data: Vec<u8>, value: U256) -> Self {
		Self {
			to: Some(to),
			data,
			value,
			..Self::default()
		}
	}

	/// A plain native transfer.
	pub fn transfer(to: Address, value: U256) -> Self {
		Self {
			to: Some(to),
			value,
			..Self::default()
		}
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		TransactionRequest {
			to: tx.to.map(TxKind::Call),
			value: Some(tx.value),
			input: TransactionInput::new(tx.data.into()),
			gas: tx.gas_limit,
			gas_price: tx.gas_price,
			max_fee_per_gas: tx.max_fee_per_gas,
			max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
			nonce: tx.nonce,
			..Default::default()
		}
	}
}
