//! Orchestration core of the pharos-farmer workspace.
//!
//! The [`Farmer`] engine drives the whole reward cycle: wallets are
//! partitioned into fixed-size batches, batches run sequentially, wallets
//! within a batch run concurrently with a start stagger, and the entire
//! cycle repeats after a cooldown. A failure inside one wallet's sequence
//! is logged and isolated; it never aborts sibling wallets or the loop.

use farmer_account::{AccountError, Wallet};
use farmer_chain::{proxy, AlloyChain, ChainError, ChainService};
use farmer_config::Config;
use farmer_points::{HttpPointsClient, PointsError};
use farmer_types::SecretString;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod abi;
pub mod actions;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use actions::{ActionError, ActionOutcome};
pub use session::WalletSession;

/// Errors that can occur at the orchestration level.
#[derive(Debug, Error)]
pub enum FarmerError {
	/// No private key yielded a usable wallet. The only fatal startup
	/// condition.
	#[error("no usable wallets configured")]
	NoWallets,
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	Chain(#[from] ChainError),
	#[error(transparent)]
	Points(#[from] PointsError),
}

/// The batch orchestrator.
pub struct Farmer {
	config: Arc<Config>,
	wallets: Vec<Wallet>,
	proxies: Vec<String>,
}

impl Farmer {
	/// Builds the orchestrator from validated configuration and collected
	/// private keys. Unusable keys are skipped with a warning; zero usable
	/// wallets is fatal.
	pub fn new(config: Config, keys: Vec<SecretString>) -> Result<Self, FarmerError> {
		let chain_id = config.network.chain_id;

		let mut wallets = Vec::with_capacity(keys.len());
		for key in &keys {
			match Wallet::from_private_key(key, chain_id) {
				Ok(wallet) => wallets.push(wallet),
				Err(error) => tracing::warn!(%error, "skipping unusable private key"),
			}
		}
		if wallets.is_empty() {
			return Err(FarmerError::NoWallets);
		}

		let proxies = match &config.proxy.file {
			Some(path) => load_proxies(path),
			None => Vec::new(),
		};

		Ok(Self {
			config: Arc::new(config),
			wallets,
			proxies,
		})
	}

	/// Runs farming cycles forever.
	///
	/// Only external process termination stops the loop; per-wallet and
	/// per-action failures are absorbed below this level.
	pub async fn run(&self) -> Result<(), FarmerError> {
		let concurrency = self.config.bot.concurrency.max(1);

		loop {
			tracing::info!(
				wallets = self.wallets.len(),
				batches = self.wallets.len().div_ceil(concurrency),
				"starting farming cycle"
			);

			for (batch_index, batch) in self.wallets.chunks(concurrency).enumerate() {
				tracing::info!(batch = batch_index + 1, size = batch.len(), "processing batch");

				let tasks = batch.iter().enumerate().map(|(offset, wallet)| {
					let wallet = wallet.clone();
					let config = Arc::clone(&self.config);
					let proxy = self.pick_proxy();

					async move {
						let stagger = config.bot.stagger_seconds * offset as u64;
						if stagger > 0 {
							tokio::time::sleep(Duration::from_secs(stagger)).await;
						}

						let address = wallet.address();
						if let Err(error) = run_wallet(wallet, config, proxy).await {
							tracing::error!(%address, %error, "wallet cycle failed");
						}
					}
				});
				futures::future::join_all(tasks).await;

				tracing::info!(batch = batch_index + 1, "batch complete");
			}

			tracing::info!("all batches complete");
			countdown(Duration::from_secs(self.config.bot.cooldown_minutes * 60)).await;
		}
	}

	fn pick_proxy(&self) -> Option<String> {
		let mut rng = rand::thread_rng();
		self.proxies.choose(&mut rng).cloned()
	}
}

/// Connects one wallet's clients and runs its cycle.
async fn run_wallet(
	wallet: Wallet,
	config: Arc<Config>,
	proxy: Option<String>,
) -> Result<(), FarmerError> {
	let http_client = proxy::validated_client(
		proxy.as_deref(),
		&config.proxy.echo_url,
		config.proxy.validation_timeout(),
	)
	.await?;

	let chain = AlloyChain::connect(
		&config.network,
		wallet.signer().clone(),
		http_client,
		&config.connection.policy(),
	)
	.await?;
	let chain = ChainService::new(Arc::new(chain), config.confirmation.policy());

	let points = HttpPointsClient::new(
		config.points.base_url.clone(),
		config.points.referer.clone(),
		config.points.invite_code.clone(),
		proxy.as_deref(),
	)?;

	let mut session = WalletSession::new(wallet, chain, Arc::new(points), config);
	session.run_cycle().await;
	Ok(())
}

/// Loads the proxy list; a missing or unreadable file degrades to direct
/// mode.
fn load_proxies(path: &str) -> Vec<String> {
	match std::fs::read_to_string(path) {
		Ok(raw) => {
			let proxies: Vec<String> = raw
				.lines()
				.map(str::trim)
				.filter(|line| !line.is_empty())
				.map(str::to_string)
				.collect();
			tracing::info!(count = proxies.len(), path, "loaded proxy list");
			proxies
		}
		Err(error) => {
			tracing::warn!(path, %error, "proxy list unavailable, running in direct mode");
			Vec::new()
		}
	}
}

/// Sleeps out the cooldown, logging the remaining time once a minute.
async fn countdown(total: Duration) {
	let total_secs = total.as_secs();
	tracing::info!(minutes = total_secs / 60, "cooling down before the next cycle");

	let mut remaining = total_secs;
	while remaining > 0 {
		let step = remaining.min(60);
		tokio::time::sleep(Duration::from_secs(step)).await;
		remaining -= step;
		if remaining > 0 {
			tracing::info!(
				minutes = remaining / 60,
				seconds = remaining % 60,
				"next cycle countdown"
			);
		}
	}

	tracing::info!("cooldown complete, restarting");
}
