//! Formatting and amount-conversion helpers.

use alloy_primitives::utils::{format_units, parse_units, UnitsError};
use alloy_primitives::U256;

/// Browser User-Agent strings rotated across outbound HTTP requests.
pub const USER_AGENTS: &[&str] = &[
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
	"Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:138.0) Gecko/20100101 Firefox/138.0",
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Picks a User-Agent at random from the fixed pool.
pub fn random_user_agent() -> &'static str {
	use rand::seq::SliceRandom;
	USER_AGENTS
		.choose(&mut rand::thread_rng())
		.copied()
		.unwrap_or(USER_AGENTS[0])
}

/// Ensures a hex string carries a `0x` prefix.
pub fn with_0x_prefix(hex: &str) -> String {
	if hex.starts_with("0x") {
		hex.to_string()
	} else {
		format!("0x{hex}")
	}
}

/// Strips a leading `0x` prefix if present.
pub fn without_0x_prefix(hex: &str) -> &str {
	hex.strip_prefix("0x").unwrap_or(hex)
}

/// Truncates an identifier for display, keeping the first 10 characters.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Parses a decimal token amount (e.g. `"0.0001"`) into its integer
/// representation for a token with the given decimals.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
	Ok(parse_units(amount, decimals)?.get_absolute())
}

/// Formats an integer token amount back into a decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
	format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}
