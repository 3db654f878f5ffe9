//! Main entry point for the pharos-farmer service.
//!
//! Loads configuration, collects wallet keys from the environment, and
//! runs the batch orchestrator until the process is terminated.

use clap::Parser;
use farmer_config::Config;
use farmer_core::Farmer;
use std::path::PathBuf;

/// Command-line arguments for the farmer service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started farmer");

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path)?;
	tracing::info!(
		network = config.network.name.as_str(),
		chain_id = config.network.chain_id,
		"Loaded configuration"
	);

	let keys = config.collect_private_keys();
	if keys.is_empty() {
		tracing::error!(
			prefix = config.wallets.key_prefix.as_str(),
			"no usable private keys found in configuration or environment"
		);
		std::process::exit(1);
	}
	tracing::info!(wallets = keys.len(), "Collected wallet keys");

	let farmer = Farmer::new(config, keys)?;
	farmer.run().await?;

	tracing::info!("Stopped farmer");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn args_default_values() {
		let args = Args::parse_from(["farmer"]);
		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn args_custom_values() {
		let args = Args::parse_from(["farmer", "--config", "custom.toml", "--log-level", "debug"]);
		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
	}
}
