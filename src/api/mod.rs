//! Backend API access.
//!
//! [`AnalyticsApi`] is the seam between the session/fetch logic and the
//! network: the CLI uses the `ureq`-based [`client::ApiClient`], tests use
//! scripted fakes.

use anyhow::Result;
use serde_json::Value;

pub mod client;
pub mod envelope;

pub use client::ApiClient;
pub use envelope::{ApiEnvelope, LoginData};

/// Result of an authenticated list request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// HTTP 401: the token is no longer accepted, whatever the body says.
    Unauthorized,
    /// Any other decoded response.
    Envelope(ApiEnvelope<Vec<Value>>),
}

/// Operations the dashboard needs from the backend.
pub trait AnalyticsApi {
    /// `POST /auth/login`. Rejected passwords come back as `Ok` with
    /// `success: false`; only transport and decode failures are `Err`.
    fn login(&self, password: &str) -> Result<ApiEnvelope<LoginData>>;

    /// `GET /analytics` with a bearer token.
    fn fetch_analytics(&self, token: &str) -> Result<FetchOutcome>;
}
