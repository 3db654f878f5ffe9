//! HTTP implementation of the reward-service client.

use crate::{
	CheckInStatus, FaucetStatus, PointsError, PointsInterface, SessionToken, UserProfile,
};
use async_trait::async_trait;
use farmer_types::{random_user_agent, truncate_id, Address, TxHash};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope shared by every reward-service endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
	code: i64,
	#[serde(default)]
	msg: String,
	data: Option<T>,
}

impl<T> Envelope<T> {
	/// Unwraps the payload of a successful response.
	fn into_data(self, endpoint: &str) -> Result<T, PointsError> {
		if self.code != 0 {
			return Err(PointsError::Api {
				code: self.code,
				msg: self.msg,
			});
		}
		self.data.ok_or_else(|| {
			PointsError::InvalidResponse(format!("{endpoint}: success without payload"))
		})
	}
}

#[derive(Debug, Deserialize)]
struct LoginData {
	jwt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FaucetStatusData {
	is_able_to_faucet: bool,
	// The service misspells this field; keep the wire name.
	#[serde(rename = "avaliable_timestamp", default)]
	available_timestamp: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
	#[serde(default)]
	verified: bool,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
	user_info: UserInfoData,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
	#[serde(rename = "ID")]
	id: u64,
	#[serde(rename = "TaskPoints", default)]
	task_points: u64,
	#[serde(rename = "TotalPoints", default)]
	total_points: u64,
}

/// Reward-service client over HTTP.
pub struct HttpPointsClient {
	client: reqwest::Client,
	base_url: String,
	referer: String,
	invite_code: String,
}

impl HttpPointsClient {
	/// Builds a client, optionally routing every request through `proxy`.
	pub fn new(
		base_url: impl Into<String>,
		referer: impl Into<String>,
		invite_code: impl Into<String>,
		proxy: Option<&str>,
	) -> Result<Self, PointsError> {
		let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
		if let Some(proxy_url) = proxy {
			builder = builder.proxy(
				reqwest::Proxy::all(proxy_url)
					.map_err(|e| PointsError::Network(format!("invalid proxy: {e}")))?,
			);
		}

		Ok(Self {
			client: builder
				.build()
				.map_err(|e| PointsError::Network(e.to_string()))?,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			referer: referer.into(),
			invite_code: invite_code.into(),
		})
	}

	/// Issues a request with the service's standing headers: a bearer
	/// token (the literal `null` before login, as the web client sends),
	/// the configured referer, and a fresh random User-Agent.
	async fn request<T: DeserializeOwned>(
		&self,
		method: reqwest::Method,
		endpoint: &str,
		url: String,
		token: Option<&SessionToken>,
	) -> Result<Envelope<T>, PointsError> {
		let bearer = match token {
			Some(token) => format!("Bearer {}", token.as_str()),
			None => "Bearer null".to_string(),
		};

		let response = self
			.client
			.request(method, url)
			.header("accept", "application/json, text/plain, */*")
			.header("authorization", bearer)
			.header("Referer", self.referer.as_str())
			.header("User-Agent", random_user_agent())
			.send()
			.await
			.map_err(|e| PointsError::Network(format!("{endpoint}: {e}")))?;

		response
			.json::<Envelope<T>>()
			.await
			.map_err(|e| PointsError::InvalidResponse(format!("{endpoint}: {e}")))
	}
}

#[async_trait]
impl PointsInterface for HttpPointsClient {
	async fn login(&self, address: Address, signature: &str) -> Result<SessionToken, PointsError> {
		let url = format!(
			"{}/user/login?address={}&signature={}&invite_code={}",
			self.base_url, address, signature, self.invite_code
		);

		let envelope: Envelope<LoginData> = self
			.request(reqwest::Method::GET, "login", url, None)
			.await?;

		if envelope.code != 0 {
			return Err(PointsError::Auth(envelope.msg));
		}

		let jwt = envelope
			.data
			.and_then(|d| d.jwt)
			.filter(|jwt| !jwt.is_empty())
			.ok_or_else(|| PointsError::Auth("login response carried no token".to_string()))?;

		tracing::debug!(%address, token = %truncate_id(&jwt), "logged in");
		Ok(SessionToken::new(jwt))
	}

	async fn check_in(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<CheckInStatus, PointsError> {
		let url = format!("{}/sign/in?address={}", self.base_url, address);

		let envelope: Envelope<serde_json::Value> = self
			.request(reqwest::Method::POST, "check-in", url, Some(token))
			.await?;

		// A non-zero code here almost always means the daily check-in was
		// already recorded; the caller decides how loudly to report it.
		Ok(CheckInStatus {
			success: envelope.code == 0,
			already_done: envelope.code != 0,
		})
	}

	async fn faucet_status(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<FaucetStatus, PointsError> {
		let url = format!("{}/faucet/status?address={}", self.base_url, address);

		let data = self
			.request::<FaucetStatusData>(reqwest::Method::GET, "faucet-status", url, Some(token))
			.await?
			.into_data("faucet-status")?;

		Ok(FaucetStatus {
			eligible: data.is_able_to_faucet,
			next_eligible_at: data.available_timestamp,
		})
	}

	async fn claim_faucet(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<(), PointsError> {
		let url = format!("{}/faucet/daily?address={}", self.base_url, address);

		let envelope: Envelope<serde_json::Value> = self
			.request(reqwest::Method::POST, "faucet-claim", url, Some(token))
			.await?;

		if envelope.code != 0 {
			return Err(PointsError::Api {
				code: envelope.code,
				msg: envelope.msg,
			});
		}
		Ok(())
	}

	async fn verify_task(
		&self,
		token: &SessionToken,
		address: Address,
		tx_hash: TxHash,
		task_id: u64,
	) -> Result<bool, PointsError> {
		let url = format!(
			"{}/task/verify?address={}&task_id={}&tx_hash={}",
			self.base_url, address, task_id, tx_hash
		);

		let data = self
			.request::<VerifyData>(reqwest::Method::POST, "task-verify", url, Some(token))
			.await?
			.into_data("task-verify")?;

		Ok(data.verified)
	}

	async fn profile(
		&self,
		token: &SessionToken,
		address: Address,
	) -> Result<UserProfile, PointsError> {
		let url = format!("{}/user/profile?address={}", self.base_url, address);

		let data = self
			.request::<ProfileData>(reqwest::Method::GET, "profile", url, Some(token))
			.await?
			.into_data("profile")?;

		Ok(UserProfile {
			user_id: data.user_info.id,
			task_points: data.user_info.task_points,
			total_points: data.user_info.total_points,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn envelope_success_unwraps_payload() {
		let envelope: Envelope<LoginData> =
			serde_json::from_str(r#"{"code": 0, "msg": "", "data": {"jwt": "abc.def.ghi"}}"#)
				.unwrap();
		let data = envelope.into_data("login").unwrap();
		assert_eq!(data.jwt.as_deref(), Some("abc.def.ghi"));
	}

	#[test]
	fn envelope_failure_carries_code_and_message() {
		let envelope: Envelope<LoginData> =
			serde_json::from_str(r#"{"code": 7, "msg": "invalid signature"}"#).unwrap();
		let error = envelope.into_data("login").unwrap_err();
		assert!(matches!(error, PointsError::Api { code: 7, .. }));
	}

	#[test]
	fn envelope_success_without_payload_is_invalid() {
		let envelope: Envelope<LoginData> =
			serde_json::from_str(r#"{"code": 0, "msg": "ok"}"#).unwrap();
		assert!(matches!(
			envelope.into_data("login"),
			Err(PointsError::InvalidResponse(_))
		));
	}

	#[test]
	fn faucet_status_keeps_the_wire_misspelling() {
		let envelope: Envelope<FaucetStatusData> = serde_json::from_str(
			r#"{"code": 0, "msg": "", "data": {"is_able_to_faucet": false, "avaliable_timestamp": 1767225600}}"#,
		)
		.unwrap();
		let data = envelope.into_data("faucet-status").unwrap();
		assert!(!data.is_able_to_faucet);
		assert_eq!(data.available_timestamp, Some(1767225600));
	}

	#[test]
	fn profile_decodes_pascal_case_fields() {
		let envelope: Envelope<ProfileData> = serde_json::from_str(
			r#"{"code": 0, "msg": "", "data": {"user_info": {"ID": 12, "TaskPoints": 300, "TotalPoints": 450}}}"#,
		)
		.unwrap();
		let data = envelope.into_data("profile").unwrap();
		assert_eq!(data.user_info.id, 12);
		assert_eq!(data.user_info.task_points, 300);
		assert_eq!(data.user_info.total_points, 450);
	}

	#[test]
	fn client_rejects_malformed_proxies() {
		let result = HttpPointsClient::new(
			"https://api.example.xyz",
			"https://app.example.xyz",
			"CODE",
			Some("\0"),
		);
		assert!(matches!(result, Err(PointsError::Network(_))));
	}

	#[test]
	fn base_url_trailing_slash_is_normalized() {
		let client = HttpPointsClient::new(
			"https://api.example.xyz/",
			"https://app.example.xyz",
			"CODE",
			None,
		)
		.unwrap();
		assert_eq!(client.base_url, "https://api.example.xyz");
	}
}
