//! Common types for the pharos-farmer workspace.
//!
//! This crate defines the data types shared by every other crate in the
//! workspace: transaction requests and receipts, network and token
//! configuration, the backoff policy used by all retrying call sites, and a
//! zeroizing wrapper for private keys.

/// Transaction receipts, pending handles and fee data.
pub mod delivery;
/// Network, token and contract configuration types.
pub mod networks;
/// Exponential-backoff retry policy and combinator.
pub mod retry;
/// Secure string type for private keys.
pub mod secret_string;
/// Transaction request type submitted to the chain.
pub mod transaction;
/// Formatting and amount-conversion helpers.
pub mod utils;

pub use delivery::{FeeData, PendingTransaction, TransactionReceipt, DEFAULT_GAS_PRICE};
pub use networks::{ContractsConfig, NetworkConfig, TokenConfig};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use secret_string::SecretString;
pub use transaction::Transaction;
pub use utils::{
	format_amount, parse_amount, random_user_agent, truncate_id, with_0x_prefix, without_0x_prefix,
};

// The workspace is single-chain EVM, so the alloy primitives are used
// directly instead of chain-neutral byte wrappers.
pub use alloy_primitives::{Address, TxHash, U256};
