//! Wallet management for the pharos-farmer workspace.
//!
//! A [`Wallet`] wraps a local secp256k1 signer built from a private key. It
//! signs the reward-service login message and hands its signer to the chain
//! client for transaction signing. Wallets are constructed once per run and
//! never persisted.

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use farmer_types::{with_0x_prefix, SecretString};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The supplied private key is not a valid 32-byte hex string.
	#[error("invalid private key: {0}")]
	InvalidKey(String),
	/// Message signing failed.
	#[error("signing failed: {0}")]
	SigningFailed(String),
}

/// A local signing wallet bound to one chain.
#[derive(Clone)]
pub struct Wallet {
	signer: PrivateKeySigner,
}

impl Wallet {
	/// Builds a wallet from a private key, binding the signer to `chain_id`.
	pub fn from_private_key(key: &SecretString, chain_id: u64) -> Result<Self, AccountError> {
		let signer: PrivateKeySigner = key
			.with_exposed(|k| k.parse())
			.map_err(|_| AccountError::InvalidKey("not a 32-byte hex string".to_string()))?;
		Ok(Self {
			signer: signer.with_chain_id(Some(chain_id)),
		})
	}

	/// The wallet's checksummed address.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs a plain-text message (EIP-191) and returns the signature as a
	/// `0x`-prefixed hex string, the format the reward service expects.
	pub async fn sign_message(&self, message: &str) -> Result<String, AccountError> {
		let signature = self
			.signer
			.sign_message(message.as_bytes())
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(with_0x_prefix(&hex::encode(signature.as_bytes())))
	}

	/// The underlying signer, used by the chain client for transactions.
	pub fn signer(&self) -> &PrivateKeySigner {
		&self.signer
	}
}

impl fmt::Debug for Wallet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Wallet")
			.field("address", &self.address())
			.finish()
	}
}

/// Generates a fresh random recipient address.
///
/// Transfer actions send to a new throwaway address on every call.
pub fn random_recipient() -> Address {
	PrivateKeySigner::random().address()
}
