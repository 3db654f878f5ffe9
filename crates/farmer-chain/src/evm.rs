//! Alloy-backed chain implementation.
//!
//! One [`AlloyChain`] is built per wallet: the wallet's signer is embedded
//! in the provider so submissions are signed locally, and the underlying
//! HTTP client (possibly proxied) is owned by that wallet alone.

use crate::{ChainError, ChainInterface};
use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use async_trait::async_trait;
use farmer_types::{
	retry_with_backoff, Address, FeeData, NetworkConfig, RetryPolicy, Transaction,
	TransactionReceipt, TxHash, U256, DEFAULT_GAS_PRICE,
};
use std::sync::Arc;

/// Chain client backed by an alloy HTTP provider.
pub struct AlloyChain {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	/// Address of the wallet embedded in the provider, used as the `from`
	/// of every simulation.
	address: Address,
}

impl AlloyChain {
	/// Connects to the first reachable endpoint of `network`.
	///
	/// Each sweep tries every configured endpoint in order and verifies
	/// liveness by fetching the current block height; sweeps repeat under
	/// `policy` with exponential backoff. All sweeps failing yields
	/// [`ChainError::Connection`].
	pub async fn connect(
		network: &NetworkConfig,
		signer: PrivateKeySigner,
		http_client: reqwest::Client,
		policy: &RetryPolicy,
	) -> Result<Self, ChainError> {
		if network.rpc_urls.is_empty() {
			return Err(ChainError::Connection(
				"no RPC endpoints configured".to_string(),
			));
		}

		let address = signer.address();
		let wallet = EthereumWallet::from(signer.with_chain_id(Some(network.chain_id)));

		retry_with_backoff(policy, "endpoint sweep", |_| {
			let wallet = wallet.clone();
			let http_client = http_client.clone();
			async move { Self::try_endpoints(network, wallet, http_client, address).await }
		})
		.await
	}

	async fn try_endpoints(
		network: &NetworkConfig,
		wallet: EthereumWallet,
		http_client: reqwest::Client,
		address: Address,
	) -> Result<Self, ChainError> {
		let mut last_error = String::from("no endpoint attempted");

		for rpc_url in &network.rpc_urls {
			let url = match rpc_url.parse() {
				Ok(url) => url,
				Err(e) => {
					tracing::warn!(endpoint = rpc_url.as_str(), error = %e, "invalid RPC URL");
					last_error = format!("invalid URL {rpc_url}: {e}");
					continue;
				}
			};

			let transport = Http::with_client(http_client.clone(), url);
			let client = RpcClient::new(transport, false);
			let provider = ProviderBuilder::new()
				.with_recommended_fillers()
				.wallet(wallet.clone())
				.on_client(client);

			match provider.get_block_number().await {
				Ok(block) => {
					tracing::info!(
						endpoint = rpc_url.as_str(),
						network = network.name.as_str(),
						chain_id = network.chain_id,
						block,
						"connected to RPC endpoint"
					);
					return Ok(Self {
						provider: Arc::new(provider),
						address,
					});
				}
				Err(error) => {
					tracing::warn!(endpoint = rpc_url.as_str(), %error, "endpoint unreachable");
					last_error = error.to_string();
				}
			}
		}

		Err(ChainError::Connection(last_error))
	}
}

/// Maps a transport error, preserving the server error code when the
/// response carried one.
fn rpc_error(error: TransportError) -> ChainError {
	match error.as_error_resp() {
		Some(payload) => ChainError::Rpc {
			code: Some(payload.code),
			message: payload.message.to_string(),
		},
		None => ChainError::Rpc {
			code: None,
			message: error.to_string(),
		},
	}
}

/// Maps an estimation failure. A server-evaluated rejection means the
/// simulation reverted; transport failures stay ordinary RPC errors.
fn estimation_error(error: TransportError) -> ChainError {
	match error.as_error_resp() {
		Some(payload) => ChainError::Estimation(payload.message.to_string()),
		None => ChainError::Rpc {
			code: None,
			message: error.to_string(),
		},
	}
}

#[async_trait]
impl ChainInterface for AlloyChain {
	async fn get_balance(
		&self,
		address: Address,
		token: Option<Address>,
	) -> Result<U256, ChainError> {
		match token {
			None => self
				.provider
				.get_balance(address)
				.await
				.map_err(rpc_error),
			Some(token) => {
				// balanceOf(address), selector 0x70a08231.
				let selector = [0x70, 0xa0, 0x82, 0x31];
				let mut call_data = Vec::with_capacity(36);
				call_data.extend_from_slice(&selector);
				call_data.extend_from_slice(&[0u8; 12]);
				call_data.extend_from_slice(address.as_slice());

				let request = TransactionRequest::default()
					.to(token)
					.input(call_data.into());
				let result = self.provider.call(&request).await.map_err(rpc_error)?;

				if result.len() < 32 {
					return Err(ChainError::rpc("short balanceOf response"));
				}
				Ok(U256::from_be_slice(&result[..32]))
			}
		}
	}

	async fn get_allowance(
		&self,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError> {
		// allowance(address,address), selector 0xdd62ed3e.
		let selector = [0xdd, 0x62, 0xed, 0x3e];
		let mut call_data = Vec::with_capacity(68);
		call_data.extend_from_slice(&selector);
		call_data.extend_from_slice(&[0u8; 12]);
		call_data.extend_from_slice(owner.as_slice());
		call_data.extend_from_slice(&[0u8; 12]);
		call_data.extend_from_slice(spender.as_slice());

		let request = TransactionRequest::default()
			.to(token)
			.input(call_data.into());
		let result = self.provider.call(&request).await.map_err(rpc_error)?;

		if result.len() < 32 {
			return Err(ChainError::rpc("short allowance response"));
		}
		Ok(U256::from_be_slice(&result[..32]))
	}

	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, ChainError> {
		let mut request: TransactionRequest = tx.clone().into();
		request.from = Some(self.address);

		self.provider
			.estimate_gas(&request)
			.await
			.map_err(estimation_error)
	}

	async fn fee_data(&self) -> Result<FeeData, ChainError> {
		let gas_price = match self.provider.get_gas_price().await {
			Ok(price) => price,
			Err(error) => {
				tracing::warn!(%error, "gas price unavailable, using 1 gwei fallback");
				DEFAULT_GAS_PRICE
			}
		};

		// Not every testnet endpoint serves fee history.
		let estimate = self.provider.estimate_eip1559_fees(None).await.ok();

		Ok(FeeData {
			gas_price,
			max_fee_per_gas: estimate.map(|e| e.max_fee_per_gas),
			max_priority_fee_per_gas: estimate.map(|e| e.max_priority_fee_per_gas),
		})
	}

	async fn submit(&self, tx: Transaction) -> Result<TxHash, ChainError> {
		let request: TransactionRequest = tx.into();

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(rpc_error)?;

		let hash = *pending.tx_hash();
		tracing::info!(%hash, "submitted transaction");
		Ok(hash)
	}

	async fn get_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>, ChainError> {
		match self.provider.get_transaction_receipt(hash).await {
			Ok(Some(receipt)) => Ok(Some(TransactionReceipt {
				hash: receipt.transaction_hash,
				block_number: receipt.block_number.unwrap_or_default(),
				success: receipt.status(),
			})),
			Ok(None) => Ok(None),
			Err(error) => Err(rpc_error(error)),
		}
	}

	async fn get_block_number(&self) -> Result<u64, ChainError> {
		self.provider.get_block_number().await.map_err(rpc_error)
	}
}
