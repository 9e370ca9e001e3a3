//! HTTP client for the analytics backend.
//!
//! Uses the synchronous `ureq` client. One request per call, no retries.
//! `ureq` reports 4xx/5xx statuses as `ureq::Error::Status`; the backend
//! still sends a JSON envelope with those, so the body is decoded from the
//! error response when possible.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::{ApiEnvelope, LoginData, LoginRequest};
use super::{AnalyticsApi, FetchOutcome};
use crate::config::schema::ApiConfig;

/// Synchronous backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Health lives beside the API prefix, not under it.
    fn health_url(&self) -> String {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{root}/health")
    }

    /// `GET /health`. Returns `false` on any failure.
    pub fn is_healthy(&self) -> bool {
        match ureq::get(&self.health_url())
            .timeout(Duration::from_secs(5))
            .call()
        {
            Ok(resp) => resp
                .into_json::<Value>()
                .map(|v| v.get("status").and_then(Value::as_str) == Some("healthy"))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// `POST /auth/verify`. `Ok(false)` when the backend rejects the token.
    pub fn verify(&self, token: &str) -> Result<bool> {
        let result = ureq::post(&self.url("/auth/verify"))
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {token}"))
            .call();

        match result {
            Ok(resp) => {
                let env: ApiEnvelope<Value> = resp
                    .into_json()
                    .context("failed to parse verify response")?;
                Ok(env.success)
            }
            Err(ureq::Error::Status(401, _)) => Ok(false),
            Err(err) => Err(err).context("verify request failed"),
        }
    }

    /// `GET /analytics/type?type=<tag>`: server-side filtered list.
    pub fn fetch_by_type(&self, token: &str, data_type: &str) -> Result<FetchOutcome> {
        let request = ureq::get(&self.url("/analytics/type"))
            .timeout(self.timeout)
            .query("type", data_type)
            .set("Authorization", &format!("Bearer {token}"));
        fetch_list(request)
    }
}

impl AnalyticsApi for ApiClient {
    fn login(&self, password: &str) -> Result<ApiEnvelope<LoginData>> {
        let body = LoginRequest {
            password: password.to_string(),
        };

        let result = ureq::post(&self.url("/auth/login"))
            .timeout(self.timeout)
            .send_json(&body);

        match result {
            Ok(resp) => decode(resp).context("failed to parse login response"),
            // Rejected logins still carry an error envelope.
            Err(ureq::Error::Status(_, resp)) => {
                decode(resp).context("failed to parse login error response")
            }
            Err(err) => Err(err).context("login request failed"),
        }
    }

    fn fetch_analytics(&self, token: &str) -> Result<FetchOutcome> {
        let request = ureq::get(&self.url("/analytics"))
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Content-Type", "application/json");
        fetch_list(request)
    }
}

fn fetch_list(request: ureq::Request) -> Result<FetchOutcome> {
    match request.call() {
        Ok(resp) => {
            let env = decode(resp).context("failed to parse analytics response")?;
            Ok(FetchOutcome::Envelope(env))
        }
        Err(ureq::Error::Status(401, _)) => Ok(FetchOutcome::Unauthorized),
        Err(ureq::Error::Status(code, resp)) => match decode(resp) {
            Ok(env) => Ok(FetchOutcome::Envelope(env)),
            Err(_) => anyhow::bail!("analytics request failed with HTTP {code}"),
        },
        Err(err) => Err(err).context("analytics request failed"),
    }
}

fn decode<T: DeserializeOwned>(resp: ureq::Response) -> Result<T> {
    Ok(resp.into_json::<T>()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
