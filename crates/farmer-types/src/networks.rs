//! Network, token and contract configuration types.
//!
//! The bot talks to a single EVM network; these types describe it, the
//! tokens it trades, and the fixed contracts it calls. All addresses
//! deserialize from `0x…` hex strings in TOML.

use alloy_primitives::Address;
use serde::Deserialize;

/// A token the bot is configured to trade.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// The target network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	/// Human-readable network name, used in logs.
	pub name: String,
	pub chain_id: u64,
	/// Candidate RPC endpoints, tried in order on connect.
	pub rpc_urls: Vec<String>,
	/// Symbol of the native currency, used in logs.
	pub currency_symbol: String,
	/// Block explorer base URL for transaction links.
	pub explorer_url: Option<String>,
}

/// Fixed on-chain contracts the bot interacts with.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
	/// Swap router exposing `multicall`.
	pub swap_router: Address,
	/// Position manager used for liquidity mints.
	pub position_manager: Address,
	/// Wrapped-native token accepting `deposit()`.
	pub wrapped_native: Address,
}
