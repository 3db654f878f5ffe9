//! Shared fakes for the executor and orchestrator tests.

use crate::session::WalletSession;
use async_trait::async_trait;
use farmer_account::Wallet;
use farmer_chain::{ChainError, ChainInterface, ChainService};
use farmer_config::{
	ActionsConfig, BotConfig, Config, ConfirmationConfig, ConnectionConfig, LiquidityConfig,
	LiquidityPairConfig, PointsApiConfig, ProxyConfig, SwapConfig, SwapPairConfig, WalletsConfig,
};
use farmer_points::{
	CheckInStatus, FaucetStatus, PointsError, PointsInterface, SessionToken, UserProfile,
};
use farmer_types::{
	Address, ContractsConfig, FeeData, NetworkConfig, RetryPolicy, SecretString, TokenConfig,
	Transaction, TransactionReceipt, TxHash, U256,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// First default anvil account.
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Chain fake with settable balances and a submission ledger.
#[derive(Default)]
pub struct MockChain {
	native_balance: Mutex<U256>,
	token_balances: Mutex<HashMap<Address, U256>>,
	allowances: Mutex<HashMap<Address, U256>>,
	estimation_failure: Mutex<Option<String>>,
	submit_failures: AtomicU32,
	/// Every call fails with a connection-style error when set.
	pub unreachable: std::sync::atomic::AtomicBool,
	pub submitted: Mutex<Vec<Transaction>>,
	pub estimate_calls: AtomicU64,
}

impl MockChain {
	pub fn unreachable() -> Self {
		let chain = Self::default();
		chain.unreachable.store(true, Ordering::SeqCst);
		chain
	}

	pub fn set_native_balance(&self, balance: U256) {
		*self.native_balance.lock().unwrap() = balance;
	}

	pub fn set_token_balance(&self, token: Address, balance: U256) {
		self.token_balances.lock().unwrap().insert(token, balance);
	}

	pub fn set_allowance(&self, token: Address, allowance: U256) {
		self.allowances.lock().unwrap().insert(token, allowance);
	}

	pub fn fail_next_submits(&self, count: u32) {
		self.submit_failures.store(count, Ordering::SeqCst);
	}

	pub fn fail_estimation(&self, reason: &str) {
		*self.estimation_failure.lock().unwrap() = Some(reason.to_string());
	}

	pub fn submitted_count(&self) -> usize {
		self.submitted.lock().unwrap().len()
	}

	fn check_reachable(&self) -> Result<(), ChainError> {
		if self.unreachable.load(Ordering::SeqCst) {
			return Err(ChainError::Rpc {
				code: None,
				message: "connection refused".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl ChainInterface for MockChain {
	async fn get_balance(
		&self,
		_address: Address,
		token: Option<Address>,
	) -> Result<U256, ChainError> {
		self.check_reachable()?;
		match token {
			None => Ok(*self.native_balance.lock().unwrap()),
			Some(token) => Ok(self
				.token_balances
				.lock()
				.unwrap()
				.get(&token)
				.copied()
				.unwrap_or(U256::ZERO)),
		}
	}

	async fn get_allowance(
		&self,
		_owner: Address,
		_spender: Address,
		token: Address,
	) -> Result<U256, ChainError> {
		self.check_reachable()?;
		Ok(self
			.allowances
			.lock()
			.unwrap()
			.get(&token)
			.copied()
			.unwrap_or(U256::ZERO))
	}

	async fn estimate_gas(&self, _tx: &Transaction) -> Result<u64, ChainError> {
		self.check_reachable()?;
		self.estimate_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(reason) = self.estimation_failure.lock().unwrap().clone() {
			return Err(ChainError::Estimation(reason));
		}
		Ok(80_000)
	}

	async fn fee_data(&self) -> Result<FeeData, ChainError> {
		self.check_reachable()?;
		Ok(FeeData::default())
	}

	async fn submit(&self, tx: Transaction) -> Result<TxHash, ChainError> {
		self.check_reachable()?;
		let mut submitted = self.submitted.lock().unwrap();
		submitted.push(tx);
		if self
			.submit_failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok()
		{
			return Err(ChainError::Rpc {
				code: None,
				message: "submission dropped".to_string(),
			});
		}
		let mut raw = [0u8; 32];
		raw[31] = submitted.len() as u8;
		Ok(TxHash::from(raw))
	}

	async fn get_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>, ChainError> {
		self.check_reachable()?;
		Ok(Some(TransactionReceipt {
			hash,
			block_number: 100,
			success: true,
		}))
	}

	async fn get_block_number(&self) -> Result<u64, ChainError> {
		self.check_reachable()?;
		Ok(100)
	}
}

/// Reward-service fake recording every call.
pub struct MockPoints {
	pub login_calls: AtomicU64,
	pub check_in_calls: AtomicU64,
	pub faucet_status_calls: AtomicU64,
	pub claim_calls: AtomicU64,
	pub verify_calls: AtomicU64,
	pub profile_calls: AtomicU64,
	eligible: bool,
	already_checked_in: bool,
	reject_login: bool,
}

impl Default for MockPoints {
	fn default() -> Self {
		Self {
			login_calls: AtomicU64::new(0),
			check_in_calls: AtomicU64::new(0),
			faucet_status_calls: AtomicU64::new(0),
			claim_calls: AtomicU64::new(0),
			verify_calls: AtomicU64::new(0),
			profile_calls: AtomicU64::new(0),
			eligible: true,
			already_checked_in: false,
			reject_login: false,
		}
	}
}

impl MockPoints {
	pub fn ineligible() -> Self {
		Self {
			eligible: false,
			..Self::default()
		}
	}

	pub fn already_checked_in() -> Self {
		Self {
			already_checked_in: true,
			..Self::default()
		}
	}

	pub fn rejecting_login() -> Self {
		Self {
			reject_login: true,
			..Self::default()
		}
	}
}

#[async_trait]
impl PointsInterface for MockPoints {
	async fn login(&self, _address: Address, _signature: &str) -> Result<SessionToken, PointsError> {
		self.login_calls.fetch_add(1, Ordering::SeqCst);
		if self.reject_login {
			return Err(PointsError::Auth("signature rejected".to_string()));
		}
		Ok(SessionToken::new("test-token".to_string()))
	}

	async fn check_in(
		&self,
		_token: &SessionToken,
		_address: Address,
	) -> Result<CheckInStatus, PointsError> {
		self.check_in_calls.fetch_add(1, Ordering::SeqCst);
		Ok(CheckInStatus {
			success: !self.already_checked_in,
			already_done: self.already_checked_in,
		})
	}

	async fn faucet_status(
		&self,
		_token: &SessionToken,
		_address: Address,
	) -> Result<FaucetStatus, PointsError> {
		self.faucet_status_calls.fetch_add(1, Ordering::SeqCst);
		Ok(FaucetStatus {
			eligible: self.eligible,
			next_eligible_at: (!self.eligible).then_some(1_900_000_000),
		})
	}

	async fn claim_faucet(
		&self,
		_token: &SessionToken,
		_address: Address,
	) -> Result<(), PointsError> {
		self.claim_calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn verify_task(
		&self,
		_token: &SessionToken,
		_address: Address,
		_tx_hash: TxHash,
		_task_id: u64,
	) -> Result<bool, PointsError> {
		self.verify_calls.fetch_add(1, Ordering::SeqCst);
		Ok(true)
	}

	async fn profile(
		&self,
		_token: &SessionToken,
		_address: Address,
	) -> Result<UserProfile, PointsError> {
		self.profile_calls.fetch_add(1, Ordering::SeqCst);
		Ok(UserProfile {
			user_id: 1,
			task_points: 10,
			total_points: 20,
		})
	}
}

/// Two-token test configuration matching the default pair tables.
pub fn test_config() -> Config {
	let wphrs = TokenConfig {
		address: "0x76aaada469d23216be5f7c596fa25f282ff9b364"
			.parse()
			.unwrap(),
		symbol: "WPHRS".to_string(),
		decimals: 18,
	};
	let usdc = TokenConfig {
		address: "0xad902cf99c2de2f1ba5ec4d642fd7e49cae9ee37"
			.parse()
			.unwrap(),
		symbol: "USDC".to_string(),
		decimals: 6,
	};

	Config {
		bot: BotConfig {
			concurrency: 2,
			stagger_seconds: 0,
			cooldown_minutes: 1,
			action_attempts: 3,
			min_action_delay_ms: 0,
			max_action_delay_ms: 0,
		},
		network: NetworkConfig {
			name: "pharos-testnet".to_string(),
			chain_id: 688688,
			rpc_urls: vec!["http://localhost:8545".to_string()],
			currency_symbol: "PHRS".to_string(),
			explorer_url: None,
		},
		wallets: WalletsConfig::default(),
		proxy: ProxyConfig::default(),
		points: PointsApiConfig {
			base_url: "http://localhost".to_string(),
			referer: "http://localhost".to_string(),
			invite_code: "TESTCODE".to_string(),
			login_message: "pharos".to_string(),
			verify_task_id: 103,
		},
		contracts: ContractsConfig {
			swap_router: "0x1a4de519154ae51200b0ad7c90f7fac75547888a"
				.parse()
				.unwrap(),
			position_manager: "0xf8a1d4ff0f9b9af7ce58e1fc1833688f3bfd6115"
				.parse()
				.unwrap(),
			wrapped_native: wphrs.address,
		},
		tokens: vec![wphrs, usdc],
		actions: ActionsConfig::default(),
		swap: SwapConfig {
			pairs: vec![SwapPairConfig {
				from: "WPHRS".to_string(),
				to: "USDC".to_string(),
				amount: "0.0001".to_string(),
				fee: 500,
			}],
		},
		liquidity: LiquidityConfig {
			pairs: vec![LiquidityPairConfig {
				token0: "WPHRS".to_string(),
				token1: "USDC".to_string(),
				amount0: "0.0001".to_string(),
				amount1: "0.0001".to_string(),
				fee: 3000,
			}],
		},
		confirmation: ConfirmationConfig::default(),
		connection: ConnectionConfig::default(),
	}
}

/// Builds a session over the given fakes with the test configuration.
pub fn session_with(chain: Arc<MockChain>, points: Arc<MockPoints>) -> WalletSession {
	let config = Arc::new(test_config());
	let wallet =
		Wallet::from_private_key(&SecretString::from(TEST_KEY), config.network.chain_id).unwrap();
	let service = ChainService::new(chain, RetryPolicy::new(5, Duration::from_millis(100)));
	WalletSession::new(wallet, service, points, config)
}
