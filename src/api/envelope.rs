//! Wire types shared by the client and the development backend.
//!
//! Every endpoint answers with the same envelope:
//! `{"success": bool, "data": ..., "error": "..."}`.

use serde::{Deserialize, Serialize};

/// Response envelope wrapping every API payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// `data` of a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: String,
    /// Expiry as epoch seconds.
    #[serde(default)]
    pub expires_at: i64,
}
