//! Forward-proxy validation for outbound HTTP clients.
//!
//! Proxies come from a user-supplied list of unknown quality. Before a
//! wallet routes its RPC traffic through one, the proxy answers a cheap
//! external IP lookup under a latency ceiling; a proxy that fails the
//! probe is discarded for this run and the wallet falls back to a direct
//! connection.

use crate::ChainError;
use farmer_types::random_user_agent;
use std::time::{Duration, Instant};

/// Overall request timeout applied to every client built here.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds an HTTP client, validating `proxy` when one is given.
///
/// The probe is a GET against `echo_url` through the proxied client; it
/// must complete within `ceiling` or the proxy is rejected. Rejection is
/// not fatal: the returned client is then a direct one.
pub async fn validated_client(
	proxy: Option<&str>,
	echo_url: &str,
	ceiling: Duration,
) -> Result<reqwest::Client, ChainError> {
	let Some(proxy_url) = proxy else {
		tracing::info!("no proxy assigned, connecting directly");
		return direct_client();
	};

	let proxied = reqwest::Client::builder()
		.proxy(
			reqwest::Proxy::all(proxy_url)
				.map_err(|e| ChainError::Connection(format!("invalid proxy {proxy_url}: {e}")))?,
		)
		.user_agent(random_user_agent())
		.timeout(REQUEST_TIMEOUT)
		.build()
		.map_err(|e| ChainError::Connection(e.to_string()))?;

	let started = Instant::now();
	let probe = tokio::time::timeout(ceiling, proxied.get(echo_url).send()).await;
	match probe {
		Ok(Ok(response)) if response.status().is_success() => {
			tracing::info!(
				proxy = proxy_url,
				latency_ms = started.elapsed().as_millis() as u64,
				"proxy validated"
			);
			Ok(proxied)
		}
		Ok(Ok(response)) => {
			tracing::warn!(
				proxy = proxy_url,
				status = %response.status(),
				"proxy probe rejected, falling back to direct connection"
			);
			direct_client()
		}
		Ok(Err(error)) => {
			tracing::warn!(
				proxy = proxy_url,
				%error,
				"proxy probe failed, falling back to direct connection"
			);
			direct_client()
		}
		Err(_) => {
			tracing::warn!(
				proxy = proxy_url,
				ceiling_ms = ceiling.as_millis() as u64,
				"proxy probe exceeded latency ceiling, falling back to direct connection"
			);
			direct_client()
		}
	}
}

fn direct_client() -> Result<reqwest::Client, ChainError> {
	reqwest::Client::builder()
		.user_agent(random_user_agent())
		.timeout(REQUEST_TIMEOUT)
		.build()
		.map_err(|e| ChainError::Connection(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn no_proxy_yields_direct_client() {
		let client = validated_client(None, "https://api.ipify.org", Duration::from_millis(3000))
			.await;
		assert!(client.is_ok());
	}

	#[tokio::test]
	async fn malformed_proxy_url_is_an_error() {
		let result = validated_client(
			Some("not a url \0"),
			"https://api.ipify.org",
			Duration::from_millis(3000),
		)
		.await;
		assert!(matches!(result, Err(ChainError::Connection(_))));
	}
}
