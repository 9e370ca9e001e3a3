//! Session gate: token-backed authenticated/unauthenticated state.
//!
//! The gate never caches the token itself: the persisted session in the
//! [`KeyValueStore`] is the single source of truth, read on construction
//! and re-read whenever a token is needed. This keeps separate CLI
//! invocations consistent with each other.
//!
//! | Transition                       | Trigger                                  |
//! |----------------------------------|------------------------------------------|
//! | → authenticated (no network)     | valid persisted session at construction  |
//! | → authenticated                  | successful [`SessionGate::login`]        |
//! | → unauthenticated (store wiped)  | expired/malformed session, 401, logout   |

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::AnalyticsApi;
use crate::events::{Event, EventKind, EventLog};
use crate::storage::{AUTH_KEY, KeyValueStore};

/// Shown when the server rejects a login without saying why.
pub const GENERIC_LOGIN_ERROR: &str = "Authentication failed. Please try again.";

/// Shown when the login request itself fails.
pub const NETWORK_LOGIN_ERROR: &str =
    "Network error. Please check your connection and try again.";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Persisted bearer-token session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Expiry, epoch seconds.
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
    /// Issue time, epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub issued_at: i64,
}

impl Session {
    /// A session is valid iff it has a token and `now < expires_at`.
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        !self.token.is_empty() && now_millis < self.expires_at.saturating_mul(1000)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp_millis())
    }

    /// Seconds until expiry (negative once expired).
    pub fn remaining_secs(&self) -> i64 {
        self.expires_at - Utc::now().timestamp()
    }
}

/// Read the persisted session. `Err` means the stored value is malformed.
fn read_session<S: KeyValueStore>(store: &S) -> Result<Option<Session>, serde_json::Error> {
    match store.get(AUTH_KEY) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some),
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Message suitable for showing inline under the password prompt.
    Failure(String),
}

/// Holds the authenticated flag and gates access to data fetching.
#[derive(Debug)]
pub struct SessionGate<S: KeyValueStore> {
    store: S,
    authenticated: bool,
    events: EventLog,
}

impl<S: KeyValueStore> SessionGate<S> {
    /// Restore state from `store` without touching the network.
    pub fn new(store: S) -> Self {
        Self::with_events(store, EventLog::disabled())
    }

    pub fn with_events(store: S, events: EventLog) -> Self {
        let mut gate = Self {
            store,
            authenticated: false,
            events,
        };
        gate.authenticated = gate.restore();
        gate
    }

    fn restore(&mut self) -> bool {
        match read_session(&self.store) {
            Ok(Some(session)) if session.is_valid() => {
                self.events.record(Event::new(EventKind::SessionRestored));
                true
            }
            Ok(Some(_)) => {
                self.discard("persisted session expired");
                false
            }
            Ok(None) => false,
            Err(err) => {
                self.events.warn(&format!("error parsing auth data: {err}"));
                self.discard("persisted session malformed");
                false
            }
        }
    }

    fn discard(&mut self, reason: &str) {
        if let Err(err) = self.store.remove(AUTH_KEY) {
            self.events.warn(&format!("failed to clear session: {err:#}"));
        }
        self.events
            .record(Event::new(EventKind::SessionDiscarded).message(reason));
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Current persisted session, if well-formed.
    pub fn session(&self) -> Option<Session> {
        read_session(&self.store).ok().flatten()
    }

    /// Bearer token of the persisted session, if any.
    pub fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    /// Exchange the shared password for a token.
    ///
    /// Never retries. On success the session is persisted before the gate
    /// reports authenticated; a store failure is reported as a failed login.
    pub fn login(&mut self, api: &impl AnalyticsApi, password: &str) -> LoginOutcome {
        if password.trim().is_empty() {
            return LoginOutcome::Failure("Password is required.".to_string());
        }

        let envelope = match api.login(password) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.events.warn(&format!("login error: {err:#}"));
                return self.fail_login(NETWORK_LOGIN_ERROR.to_string());
            }
        };

        let data = envelope.data.filter(|d| !d.token.is_empty());
        match (envelope.success, data) {
            (true, Some(data)) => {
                let session = Session {
                    token: data.token,
                    expires_at: data.expires_at,
                    issued_at: Utc::now().timestamp_millis(),
                };
                if let Err(err) = self.persist(&session) {
                    return self.fail_login(format!("Could not save session: {err:#}"));
                }
                self.authenticated = true;
                self.events.record(Event::new(EventKind::LoginSucceeded));
                LoginOutcome::Success
            }
            _ => {
                let message = envelope
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_LOGIN_ERROR.to_string());
                self.fail_login(message)
            }
        }
    }

    fn persist(&mut self, session: &Session) -> anyhow::Result<()> {
        let json = serde_json::to_string(session)?;
        self.store.set(AUTH_KEY, &json)
    }

    fn fail_login(&mut self, message: String) -> LoginOutcome {
        self.events
            .record(Event::new(EventKind::LoginFailed).message(message.clone()));
        LoginOutcome::Failure(message)
    }

    /// Drop the persisted session and demote to unauthenticated.
    pub fn logout(&mut self) {
        if let Err(err) = self.store.remove(AUTH_KEY) {
            self.events.warn(&format!("failed to clear session: {err:#}"));
        }
        self.authenticated = false;
        self.events.record(Event::new(EventKind::Logout));
    }

    /// Demote without a logout event (the store already lost the session).
    pub(crate) fn demote(&mut self) {
        self.authenticated = false;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session(token: &str, expires_at: i64) -> Session {
        Session {
            token: token.to_string(),
            expires_at,
            issued_at: 0,
        }
    }

    #[test]
    fn validity_requires_token_and_future_expiry() {
        let now_ms = 1_700_000_000_000;
        assert!(session("t", 1_700_000_001).is_valid_at(now_ms));
        assert!(!session("t", 1_700_000_000).is_valid_at(now_ms));
        assert!(!session("t", 1_600_000_000).is_valid_at(now_ms));
        assert!(!session("", 1_800_000_000).is_valid_at(now_ms));
    }

    #[test]
    fn session_uses_browser_field_names() {
        let json = serde_json::to_value(session("abc", 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"token": "abc", "expiresAt": 10, "timestamp": 0})
        );
    }

    #[test]
    fn restores_valid_session_without_network() {
        let mut store = MemoryStore::new();
        let future = Utc::now().timestamp() + 3600;
        store
            .set(AUTH_KEY, &serde_json::to_string(&session("abc", future)).unwrap())
            .unwrap();

        let gate = SessionGate::new(store);
        assert!(gate.is_authenticated());
        assert_eq!(gate.token().as_deref(), Some("abc"));
    }

    #[test]
    fn expired_session_is_removed() {
        let mut store = MemoryStore::new();
        store
            .set(AUTH_KEY, &serde_json::to_string(&session("abc", 1000)).unwrap())
            .unwrap();

        let gate = SessionGate::new(store);
        assert!(!gate.is_authenticated());
        assert_eq!(gate.store().get(AUTH_KEY), None);
    }

    #[test]
    fn malformed_session_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(AUTH_KEY, "{not json").unwrap();

        let gate = SessionGate::new(store);
        assert!(!gate.is_authenticated());
        assert_eq!(gate.store().get(AUTH_KEY), None);
    }

    #[test]
    fn logout_clears_store() {
        let mut store = MemoryStore::new();
        let future = Utc::now().timestamp() + 3600;
        store
            .set(AUTH_KEY, &serde_json::to_string(&session("abc", future)).unwrap())
            .unwrap();

        let mut gate = SessionGate::new(store);
        gate.logout();
        assert!(!gate.is_authenticated());
        assert!(gate.token().is_none());
    }
}
