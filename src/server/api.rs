//! Request handlers and token bookkeeping for the development backend.
//!
//! Responses use the same `{success, data, error}` envelope the client
//! decodes.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use serde_json::{Value, json};

use super::Reply;
use crate::api::envelope::{ApiEnvelope, LoginData, LoginRequest};
use crate::config::schema::ServerConfig;

/// Shared password check, issued tokens and the served datasets.
#[derive(Debug)]
pub struct Backend {
    password: String,
    ttl: Duration,
    /// token -> expiry in epoch seconds
    tokens: HashMap<String, i64>,
    datasets: Vec<Value>,
}

impl Backend {
    pub fn new(config: &ServerConfig, datasets: Vec<Value>) -> Self {
        Self {
            password: config.password.clone(),
            ttl: Duration::hours(config.token_ttl_hours),
            tokens: HashMap::new(),
            datasets,
        }
    }

    /// `POST /api/auth/login`
    pub(crate) fn login(&mut self, body: &str) -> Reply {
        let Ok(request) = serde_json::from_str::<LoginRequest>(body) else {
            return envelope(400, ApiEnvelope::<()>::err("Invalid request body"));
        };
        if request.password != self.password {
            return envelope(401, ApiEnvelope::<()>::err("Invalid credentials"));
        }

        let token = self.issue();
        envelope(200, ApiEnvelope::ok(token))
    }

    fn issue(&mut self) -> LoginData {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = (Utc::now() + self.ttl).timestamp();
        self.tokens.insert(token.clone(), expires_at);
        LoginData { token, expires_at }
    }

    /// Whether `token` was issued here and has not expired.
    pub fn is_valid(&mut self, token: &str) -> bool {
        let now = Utc::now().timestamp();
        self.tokens.retain(|_, expires_at| *expires_at > now);
        self.tokens.contains_key(token)
    }

    /// Bearer check in front of `handler`.
    pub(crate) fn authorized(
        &mut self,
        header: Option<&str>,
        handler: impl FnOnce(&Self) -> Reply,
    ) -> Reply {
        let Some(header) = header.filter(|h| !h.is_empty()) else {
            return envelope(401, ApiEnvelope::<()>::err("Authorization header required"));
        };
        let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
            ["Bearer", token] => *token,
            _ => {
                return envelope(
                    401,
                    ApiEnvelope::<()>::err("Invalid authorization header format"),
                );
            }
        };
        if !self.is_valid(token) {
            return envelope(401, ApiEnvelope::<()>::err("Invalid token"));
        }
        handler(self)
    }

    /// `GET /api/analytics[/type?type=<tag>]`
    pub(crate) fn analytics(&self, data_type: Option<&str>) -> Reply {
        let data: Vec<&Value> = self
            .datasets
            .iter()
            .filter(|d| data_type.is_none_or(|t| d["data_type"] == t))
            .collect();
        envelope(200, ApiEnvelope::ok(data))
    }
}

/// `GET /health`
pub(crate) fn health() -> Reply {
    Reply::Json(200, json!({ "status": "healthy" }))
}

/// `POST /api/auth/verify` after the bearer check passed.
pub(crate) fn verified() -> Reply {
    envelope(200, ApiEnvelope::ok(json!({ "status": "valid" })))
}

fn envelope<T: serde::Serialize>(status: u16, body: ApiEnvelope<T>) -> Reply {
    match serde_json::to_value(&body) {
        Ok(value) => Reply::Json(status, value),
        Err(e) => Reply::Json(
            500,
            json!({ "success": false, "error": format!("failed to serialize response: {e}") }),
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
