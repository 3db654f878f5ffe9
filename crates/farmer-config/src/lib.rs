//! Configuration for the pharos-farmer workspace.
//!
//! Configuration is a single TOML file. Before parsing, `${VAR}` and
//! `${VAR:-default}` references are resolved against the process
//! environment, which is how private keys and invite codes stay out of the
//! file itself. Parsing is followed by validation so a bad config fails at
//! startup rather than mid-cycle.

use farmer_types::{
	parse_amount, ContractsConfig, NetworkConfig, RetryPolicy, SecretString, TokenConfig,
};
use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub bot: BotConfig,
	pub network: NetworkConfig,
	#[serde(default)]
	pub wallets: WalletsConfig,
	#[serde(default)]
	pub proxy: ProxyConfig,
	pub points: PointsApiConfig,
	pub contracts: ContractsConfig,
	pub tokens: Vec<TokenConfig>,
	#[serde(default)]
	pub actions: ActionsConfig,
	pub swap: SwapConfig,
	pub liquidity: LiquidityConfig,
	#[serde(default)]
	pub confirmation: ConfirmationConfig,
	#[serde(default)]
	pub connection: ConnectionConfig,
}

/// Orchestration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
	/// Wallets processed concurrently within one batch.
	#[serde(default = "default_concurrency")]
	pub concurrency: usize,
	/// Start stagger between wallets of the same batch, in seconds.
	#[serde(default = "default_stagger_seconds")]
	pub stagger_seconds: u64,
	/// Pause between full cycles, in minutes.
	#[serde(default = "default_cooldown_minutes")]
	pub cooldown_minutes: u64,
	/// Outer attempt count for retryable actions.
	#[serde(default = "default_action_attempts")]
	pub action_attempts: u32,
	/// Lower bound of the random pause between iterations, in ms.
	#[serde(default = "default_min_action_delay_ms")]
	pub min_action_delay_ms: u64,
	/// Upper bound of the random pause between iterations, in ms.
	#[serde(default = "default_max_action_delay_ms")]
	pub max_action_delay_ms: u64,
}

impl Default for BotConfig {
	fn default() -> Self {
		Self {
			concurrency: default_concurrency(),
			stagger_seconds: default_stagger_seconds(),
			cooldown_minutes: default_cooldown_minutes(),
			action_attempts: default_action_attempts(),
			min_action_delay_ms: default_min_action_delay_ms(),
			max_action_delay_ms: default_max_action_delay_ms(),
		}
	}
}

fn default_concurrency() -> usize {
	3
}

fn default_stagger_seconds() -> u64 {
	10
}

fn default_cooldown_minutes() -> u64 {
	60
}

fn default_action_attempts() -> u32 {
	3
}

fn default_min_action_delay_ms() -> u64 {
	1000
}

fn default_max_action_delay_ms() -> u64 {
	3000
}

/// Private-key sources.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletsConfig {
	/// Explicit keys, usually `${ENV}` references. Takes precedence over
	/// the environment scan when non-empty.
	#[serde(default)]
	pub private_keys: Vec<SecretString>,
	/// Prefix of environment variables scanned for keys.
	#[serde(default = "default_key_prefix")]
	pub key_prefix: String,
}

impl Default for WalletsConfig {
	fn default() -> Self {
		Self {
			private_keys: Vec::new(),
			key_prefix: default_key_prefix(),
		}
	}
}

fn default_key_prefix() -> String {
	"PRIVATE_KEY_".to_string()
}

/// Forward-proxy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
	/// Newline-delimited proxy list; a missing file means direct mode.
	pub file: Option<String>,
	/// External IP echo endpoint used to probe proxies.
	#[serde(default = "default_echo_url")]
	pub echo_url: String,
	/// Latency ceiling for the probe, in ms.
	#[serde(default = "default_validation_timeout_ms")]
	pub validation_timeout_ms: u64,
}

impl Default for ProxyConfig {
	fn default() -> Self {
		Self {
			file: None,
			echo_url: default_echo_url(),
			validation_timeout_ms: default_validation_timeout_ms(),
		}
	}
}

fn default_echo_url() -> String {
	"https://api.ipify.org".to_string()
}

fn default_validation_timeout_ms() -> u64 {
	3000
}

impl ProxyConfig {
	pub fn validation_timeout(&self) -> Duration {
		Duration::from_millis(self.validation_timeout_ms)
	}
}

/// Reward-service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PointsApiConfig {
	pub base_url: String,
	pub referer: String,
	pub invite_code: String,
	/// Literal message signed for login.
	#[serde(default = "default_login_message")]
	pub login_message: String,
	/// Task id reported for confirmed transactions.
	#[serde(default = "default_verify_task_id")]
	pub verify_task_id: u64,
}

fn default_login_message() -> String {
	"pharos".to_string()
}

fn default_verify_task_id() -> u64 {
	103
}

/// Per-cycle action settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionsConfig {
	#[serde(default = "default_iterations")]
	pub transfers_per_cycle: u32,
	#[serde(default = "default_iterations")]
	pub wraps_per_cycle: u32,
	#[serde(default = "default_iterations")]
	pub swaps_per_cycle: u32,
	#[serde(default = "default_iterations")]
	pub liquidity_per_cycle: u32,
	/// Native amount sent per transfer, as a decimal string.
	#[serde(default = "default_transfer_amount")]
	pub transfer_amount: String,
	/// Wrap amount range `[min, max)`, as decimal strings.
	#[serde(default = "default_wrap_min")]
	pub wrap_min: String,
	#[serde(default = "default_wrap_max")]
	pub wrap_max: String,
}

impl Default for ActionsConfig {
	fn default() -> Self {
		Self {
			transfers_per_cycle: default_iterations(),
			wraps_per_cycle: default_iterations(),
			swaps_per_cycle: default_iterations(),
			liquidity_per_cycle: default_iterations(),
			transfer_amount: default_transfer_amount(),
			wrap_min: default_wrap_min(),
			wrap_max: default_wrap_max(),
		}
	}
}

fn default_iterations() -> u32 {
	10
}

fn default_transfer_amount() -> String {
	"0.000001".to_string()
}

fn default_wrap_min() -> String {
	"0.001".to_string()
}

fn default_wrap_max() -> String {
	"0.005".to_string()
}

/// Swap pair table.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapConfig {
	pub pairs: Vec<SwapPairConfig>,
}

/// One tradable direction with its per-swap amount.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapPairConfig {
	pub from: String,
	pub to: String,
	/// Amount of the source token, as a decimal string.
	pub amount: String,
	/// Pool fee tier.
	#[serde(default = "default_swap_fee")]
	pub fee: u32,
}

fn default_swap_fee() -> u32 {
	500
}

/// Liquidity pair table.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityConfig {
	pub pairs: Vec<LiquidityPairConfig>,
}

/// One liquidity position template.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityPairConfig {
	pub token0: String,
	pub token1: String,
	pub amount0: String,
	pub amount1: String,
	#[serde(default = "default_liquidity_fee")]
	pub fee: u32,
}

fn default_liquidity_fee() -> u32 {
	3000
}

/// Receipt-polling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
	#[serde(default = "default_confirmation_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_confirmation_delay_ms")]
	pub base_delay_ms: u64,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_confirmation_attempts(),
			base_delay_ms: default_confirmation_delay_ms(),
		}
	}
}

fn default_confirmation_attempts() -> u32 {
	5
}

fn default_confirmation_delay_ms() -> u64 {
	1000
}

impl ConfirmationConfig {
	pub fn policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
	}
}

/// Endpoint-sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
	#[serde(default = "default_connection_sweeps")]
	pub max_sweeps: u32,
	#[serde(default = "default_connection_delay_ms")]
	pub base_delay_ms: u64,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self {
			max_sweeps: default_connection_sweeps(),
			base_delay_ms: default_connection_delay_ms(),
		}
	}
}

fn default_connection_sweeps() -> u32 {
	3
}

fn default_connection_delay_ms() -> u64 {
	500
}

impl ConnectionConfig {
	pub fn policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.max_sweeps, Duration::from_millis(self.base_delay_ms))
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the variable's value; `${VAR_NAME:-default}`
/// falls back to the default when the variable is unset. Input is capped at
/// 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("regex error: {e}")))?;

	let mut output = String::with_capacity(input.len());
	let mut cursor = 0;

	for cap in re.captures_iter(input) {
		let matched = cap.get(0).expect("capture group 0 always exists");
		let var_name = &cap[1];
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"environment variable '{var_name}' not found"
					)))
				}
			},
		};

		output.push_str(&input[cursor..matched.start()]);
		output.push_str(&value);
		cursor = matched.end();
	}
	output.push_str(&input[cursor..]);

	Ok(output)
}

/// Whether a string is a 32-byte hex private key, with or without `0x`.
fn is_private_key(value: &str) -> bool {
	let hex = value.strip_prefix("0x").unwrap_or(value);
	hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		raw.parse()
	}

	/// Looks up a configured token by symbol.
	pub fn token(&self, symbol: &str) -> Option<&TokenConfig> {
		self.tokens.iter().find(|t| t.symbol == symbol)
	}

	/// Collects usable private keys.
	///
	/// An explicit `private_keys` list wins; otherwise every environment
	/// variable starting with the configured prefix whose value is a
	/// 32-byte hex string is taken, ordered by numeric suffix.
	pub fn collect_private_keys(&self) -> Vec<SecretString> {
		if !self.wallets.private_keys.is_empty() {
			return self
				.wallets
				.private_keys
				.iter()
				.filter(|key| key.with_exposed(is_private_key))
				.cloned()
				.collect();
		}

		let prefix = &self.wallets.key_prefix;
		let mut found: Vec<(u64, String, String)> = std::env::vars()
			.filter(|(name, value)| name.starts_with(prefix.as_str()) && is_private_key(value))
			.map(|(name, value)| {
				let suffix = name[prefix.len()..].parse::<u64>().unwrap_or(u64::MAX);
				(suffix, name, value)
			})
			.collect();
		found.sort_by(|a, b| (a.0, a.1.as_str()).cmp(&(b.0, b.1.as_str())));

		found
			.into_iter()
			.map(|(_, _, value)| SecretString::new(value))
			.collect()
	}

	/// Validates the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation("chain_id cannot be 0".into()));
		}
		if self.network.rpc_urls.is_empty() {
			return Err(ConfigError::Validation(
				"at least one RPC endpoint must be configured".into(),
			));
		}
		if self.tokens.is_empty() {
			return Err(ConfigError::Validation(
				"at least one token must be configured".into(),
			));
		}

		if self.bot.concurrency == 0 {
			return Err(ConfigError::Validation(
				"concurrency must be at least 1".into(),
			));
		}
		if self.bot.max_action_delay_ms < self.bot.min_action_delay_ms {
			return Err(ConfigError::Validation(
				"max_action_delay_ms cannot be below min_action_delay_ms".into(),
			));
		}
		if self.bot.action_attempts == 0 {
			return Err(ConfigError::Validation(
				"action_attempts must be at least 1".into(),
			));
		}

		if self.points.base_url.is_empty() {
			return Err(ConfigError::Validation(
				"points base_url cannot be empty".into(),
			));
		}
		if self.points.invite_code.is_empty() {
			return Err(ConfigError::Validation(
				"points invite_code cannot be empty".into(),
			));
		}

		if self.confirmation.max_attempts == 0 || self.confirmation.max_attempts > 20 {
			return Err(ConfigError::Validation(
				"confirmation max_attempts must be between 1 and 20".into(),
			));
		}
		if self.connection.max_sweeps == 0 {
			return Err(ConfigError::Validation(
				"connection max_sweeps must be at least 1".into(),
			));
		}

		// Native amounts use 18 decimals.
		for (field, amount) in [
			("transfer_amount", &self.actions.transfer_amount),
			("wrap_min", &self.actions.wrap_min),
			("wrap_max", &self.actions.wrap_max),
		] {
			parse_amount(amount, 18).map_err(|e| {
				ConfigError::Validation(format!("invalid {field} '{amount}': {e}"))
			})?;
		}
		let wrap_min = parse_amount(&self.actions.wrap_min, 18).expect("validated above");
		let wrap_max = parse_amount(&self.actions.wrap_max, 18).expect("validated above");
		if wrap_max < wrap_min {
			return Err(ConfigError::Validation(
				"wrap_max cannot be below wrap_min".into(),
			));
		}

		if self.swap.pairs.is_empty() {
			return Err(ConfigError::Validation(
				"at least one swap pair must be configured".into(),
			));
		}
		for pair in &self.swap.pairs {
			let from = self.token(&pair.from).ok_or_else(|| {
				ConfigError::Validation(format!("swap pair references unknown token '{}'", pair.from))
			})?;
			self.token(&pair.to).ok_or_else(|| {
				ConfigError::Validation(format!("swap pair references unknown token '{}'", pair.to))
			})?;
			parse_amount(&pair.amount, from.decimals).map_err(|e| {
				ConfigError::Validation(format!(
					"invalid swap amount '{}' for {}: {e}",
					pair.amount, pair.from
				))
			})?;
		}

		if self.liquidity.pairs.is_empty() {
			return Err(ConfigError::Validation(
				"at least one liquidity pair must be configured".into(),
			));
		}
		for pair in &self.liquidity.pairs {
			let token0 = self.token(&pair.token0).ok_or_else(|| {
				ConfigError::Validation(format!(
					"liquidity pair references unknown token '{}'",
					pair.token0
				))
			})?;
			let token1 = self.token(&pair.token1).ok_or_else(|| {
				ConfigError::Validation(format!(
					"liquidity pair references unknown token '{}'",
					pair.token1
				))
			})?;
			parse_amount(&pair.amount0, token0.decimals).map_err(|e| {
				ConfigError::Validation(format!(
					"invalid liquidity amount '{}' for {}: {e}",
					pair.amount0, pair.token0
				))
			})?;
			parse_amount(&pair.amount1, token1.decimals).map_err(|e| {
				ConfigError::Validation(format!(
					"invalid liquidity amount '{}' for {}: {e}",
					pair.amount1, pair.token1
				))
			})?;
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
