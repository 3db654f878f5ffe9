//! Wrapping native currency into its ERC-20 equivalent.

use crate::abi;
use crate::actions::{amount_in_units, random_amount_between, ActionError, ActionOutcome};
use crate::session::WalletSession;
use alloy_sol_types::SolCall;
use farmer_types::{format_amount, Transaction};

impl WalletSession {
	/// Deposits a random amount from the configured range into the
	/// wrapped-native contract. Runs at most once per iteration.
	pub async fn wrap(&self, index: u32) -> Result<ActionOutcome, ActionError> {
		let min = amount_in_units(&self.config.actions.wrap_min, 18)?;
		let max = amount_in_units(&self.config.actions.wrap_max, 18)?;
		let amount = random_amount_between(min, max)?;

		tracing::info!(
			iteration = index + 1,
			amount = %format_amount(amount, 18),
			currency = self.config.network.currency_symbol.as_str(),
			"preparing wrap"
		);

		if !self.check_balance(None, amount).await? {
			return Ok(ActionOutcome::Skipped);
		}

		let data = abi::IWrappedNative::depositCall {}.abi_encode();
		let tx = Transaction::call_with_value(self.config.contracts.wrapped_native, data, amount);

		let pending = self.chain.send(tx).await?;
		tracing::info!(hash = %pending.hash, "wrap submitted, awaiting confirmation");
		let receipt = self.chain.wait_for_receipt(&pending).await?;

		self.verify_transaction(&receipt).await;
		Ok(ActionOutcome::Confirmed(receipt))
	}
}
