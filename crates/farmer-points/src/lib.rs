//! Reward-service client for the pharos-farmer workspace.
//!
//! The reward service tracks per-wallet points. All calls are stateless
//! HTTP requests authenticated by a bearer token obtained from a
//! signed-message login; every response shares the `{code, msg, data}`
//! envelope where `code == 0` means success.

use async_trait::async_trait;
use farmer_types::{Address, TxHash};
use thiserror::Error;

pub mod http;

pub use http::HttpPointsClient;

/// Errors that can occur against the reward service.
#[derive(Debug, Error)]
pub enum PointsError {
	/// Login was rejected or returned no token.
	#[error("authentication rejected: {0}")]
	Auth(String),
	/// The request never produced a usable response.
	#[error("network error: {0}")]
	Network(String),
	/// The service answered with a non-zero envelope code.
	#[error("service returned code {code}: {msg}")]
	Api { code: i64, msg: String },
	/// The response body did not match the expected shape.
	#[error("malformed response: {0}")]
	InvalidResponse(String),
}

/// Bearer token returned by login, scoped to one wallet and one run.
#[derive(Debug, Clone)]
pub struct SessionToken(String);

impl SessionToken {
	pub fn new(token: String) -> Self {
		Self(token)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Result of a daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInStatus {
	/// The check-in was recorded by this call.
	pub success: bool,
	/// The wallet had already checked in inside the current window.
	pub already_done: bool,
}

/// Faucet eligibility for a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaucetStatus {
	pub eligible: bool,
	/// Unix timestamp at which the wallet becomes eligible again.
	pub next_eligible_at: Option<u64>,
}

/// Points standing of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserProfile {
	pub user_id: u64,
	pub task_points: u64,
	pub total_points: u64,
}

/// Interface to the reward-tracking service.
///
/// The concrete implementation is [`HttpPointsClient`]; the trait exists
/// so the executors can run against a recording fake in tests.
#[async_trait]
pub trait PointsInterface: Send + Sync {
	/// Exchanges a signed login message for a session token.
	async fn login(&self, address: Address, signature: &str) -> Result<SessionToken, PointsError>;

	/// Performs the daily check-in. An "already checked in" answer is
	/// reported through the status, not as an error.
	async fn check_in(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<CheckInStatus, PointsError>;

	/// Queries faucet eligibility.
	async fn faucet_status(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<FaucetStatus, PointsError>;

	/// Claims the faucet grant.
	async fn claim_faucet(&self, token: &SessionToken, address: Address)
		-> Result<(), PointsError>;

	/// Reports a confirmed transaction for task credit.
	async fn verify_task(
		&self,
		token: &SessionToken,
		address: Address,
		tx_hash: TxHash,
		task_id: u64,
	) -> Result<bool, PointsError>;

	/// Fetches the wallet's points standing.
	async fn profile(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<UserProfile, PointsError>;
}
