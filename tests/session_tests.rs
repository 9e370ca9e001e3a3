/// Integration tests for the session gate and the fetch/normalize layer.
///
/// The backend is replaced by a scripted [`AnalyticsApi`] so every login and
/// fetch outcome can be produced on demand:
///
/// - login success, rejection and transport failure
/// - 401 during fetch clearing the persisted session
/// - failed loads leaving the session intact
use std::cell::Cell;

use anyhow::{Result, anyhow};
use chrono::Utc;
use serde_json::{Value, json};

use fresherpaint::api::{AnalyticsApi, ApiEnvelope, FetchOutcome, LoginData};
use fresherpaint::events::{EventKind, EventLog};
use fresherpaint::loader::{self, LoadState};
use fresherpaint::session::{
    GENERIC_LOGIN_ERROR, LoginOutcome, NETWORK_LOGIN_ERROR, Session, SessionGate,
};
use fresherpaint::storage::{AUTH_KEY, KeyValueStore, MemoryStore};

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

enum LoginScript {
    Token(&'static str),
    Rejected(Option<&'static str>),
    SuccessWithoutToken,
    NetworkDown,
}

enum FetchScript {
    Records(Vec<Value>),
    Unauthorized,
    ApiError(&'static str),
    NetworkDown,
}

struct FakeApi {
    login: LoginScript,
    fetch: FetchScript,
    fetch_calls: Cell<usize>,
}

impl FakeApi {
    fn new(login: LoginScript, fetch: FetchScript) -> Self {
        Self {
            login,
            fetch,
            fetch_calls: Cell::new(0),
        }
    }
}

impl AnalyticsApi for FakeApi {
    fn login(&self, _password: &str) -> Result<ApiEnvelope<LoginData>> {
        match &self.login {
            LoginScript::Token(token) => Ok(ApiEnvelope::ok(LoginData {
                token: token.to_string(),
                expires_at: Utc::now().timestamp() + 3600,
            })),
            LoginScript::Rejected(Some(msg)) => Ok(ApiEnvelope::err(*msg)),
            LoginScript::Rejected(None) => Ok(ApiEnvelope {
                success: false,
                data: None,
                error: None,
            }),
            LoginScript::SuccessWithoutToken => Ok(ApiEnvelope::ok(LoginData::default())),
            LoginScript::NetworkDown => Err(anyhow!("connection refused")),
        }
    }

    fn fetch_analytics(&self, _token: &str) -> Result<FetchOutcome> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        match &self.fetch {
            FetchScript::Records(records) => {
                Ok(FetchOutcome::Envelope(ApiEnvelope::ok(records.clone())))
            }
            FetchScript::Unauthorized => Ok(FetchOutcome::Unauthorized),
            FetchScript::ApiError(msg) => Ok(FetchOutcome::Envelope(ApiEnvelope::err(*msg))),
            FetchScript::NetworkDown => Err(anyhow!("connection reset")),
        }
    }
}

fn raw_record(id: &str, tag: &str) -> Value {
    json!({
        "ID": id,
        "Title": format!("Dataset {id}"),
        "Description": "",
        "DataType": tag,
        "Data": {},
        "CreatedAt": "2024-01-01T00:00:00Z",
        "UpdatedAt": "2024-01-02T00:00:00Z"
    })
}

fn logged_in_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let session = Session {
        token: "tok".to_string(),
        expires_at: Utc::now().timestamp() + 3600,
        issued_at: Utc::now().timestamp_millis(),
    };
    store
        .set(AUTH_KEY, &serde_json::to_string(&session).unwrap())
        .unwrap();
    store
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn successful_login_persists_session_before_authenticating() {
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::Records(vec![]));
    let mut gate = SessionGate::new(MemoryStore::new());

    assert_eq!(gate.login(&api, "source.tide.white"), LoginOutcome::Success);
    assert!(gate.is_authenticated());

    let stored: Value = serde_json::from_str(&gate.store().get(AUTH_KEY).unwrap()).unwrap();
    assert_eq!(stored["token"], json!("abc"));
    assert!(stored["expiresAt"].as_i64().unwrap() > Utc::now().timestamp());
    assert!(stored["timestamp"].as_i64().is_some());
}

#[test]
fn rejected_login_surfaces_server_message() {
    let api = FakeApi::new(
        LoginScript::Rejected(Some("Invalid credentials")),
        FetchScript::Records(vec![]),
    );
    let mut gate = SessionGate::new(MemoryStore::new());

    assert_eq!(
        gate.login(&api, "wrong"),
        LoginOutcome::Failure("Invalid credentials".to_string())
    );
    assert!(!gate.is_authenticated());
    assert!(gate.store().get(AUTH_KEY).is_none());
}

#[test]
fn rejected_login_without_message_uses_generic_text() {
    let api = FakeApi::new(LoginScript::Rejected(None), FetchScript::Records(vec![]));
    let mut gate = SessionGate::new(MemoryStore::new());
    assert_eq!(
        gate.login(&api, "wrong"),
        LoginOutcome::Failure(GENERIC_LOGIN_ERROR.to_string())
    );

    let api = FakeApi::new(LoginScript::SuccessWithoutToken, FetchScript::Records(vec![]));
    assert_eq!(
        gate.login(&api, "pw"),
        LoginOutcome::Failure(GENERIC_LOGIN_ERROR.to_string())
    );
    assert!(!gate.is_authenticated());
}

#[test]
fn network_failure_during_login_is_reported_as_such() {
    let api = FakeApi::new(LoginScript::NetworkDown, FetchScript::Records(vec![]));
    let mut gate = SessionGate::new(MemoryStore::new());
    assert_eq!(
        gate.login(&api, "pw"),
        LoginOutcome::Failure(NETWORK_LOGIN_ERROR.to_string())
    );
}

#[test]
fn empty_password_is_rejected_locally() {
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::Records(vec![]));
    let mut gate = SessionGate::new(MemoryStore::new());
    assert!(matches!(gate.login(&api, "  "), LoginOutcome::Failure(_)));
    assert!(!gate.is_authenticated());
}

// ---------------------------------------------------------------------------
// Fetch / normalize
// ---------------------------------------------------------------------------

#[test]
fn authenticated_load_normalizes_every_record() {
    let api = FakeApi::new(
        LoginScript::Token("abc"),
        FetchScript::Records(vec![raw_record("1", "physics"), raw_record("2", "computer_science")]),
    );
    let mut gate = SessionGate::new(logged_in_store());

    let state = loader::load(&mut gate, &api);
    let records = state.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[1].data_type.as_str(), "computer_science");
}

#[test]
fn unauthenticated_gate_never_fetches() {
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::Records(vec![]));
    let mut gate = SessionGate::new(MemoryStore::new());

    assert_eq!(loader::load(&mut gate, &api), LoadState::Unauthenticated);
    assert_eq!(api.fetch_calls.get(), 0);
}

#[test]
fn unauthorized_fetch_logs_out_and_clears_store() {
    let dir = tempfile::tempdir().unwrap();
    let events = EventLog::at(dir.path().join("events.jsonl"));
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::Unauthorized);
    let mut gate = SessionGate::with_events(logged_in_store(), events.clone());

    let state = loader::load(&mut gate, &api);

    assert_eq!(state, LoadState::Unauthenticated);
    assert!(state.records().is_empty());
    assert!(!gate.is_authenticated());
    assert!(gate.store().get(AUTH_KEY).is_none());

    let kinds: Vec<EventKind> = events.read_all().iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&EventKind::FetchUnauthorized));
    assert!(kinds.contains(&EventKind::Logout));
}

#[test]
fn api_error_fails_load_but_keeps_session() {
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::ApiError("database down"));
    let mut gate = SessionGate::new(logged_in_store());

    match loader::load(&mut gate, &api) {
        LoadState::Failed(message) => assert!(message.contains("database down")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(gate.is_authenticated());
    assert!(gate.store().get(AUTH_KEY).is_some());
}

#[test]
fn network_error_fails_load() {
    let api = FakeApi::new(LoginScript::Token("abc"), FetchScript::NetworkDown);
    let mut gate = SessionGate::new(logged_in_store());

    assert!(matches!(loader::load(&mut gate, &api), LoadState::Failed(_)));
    assert!(gate.is_authenticated());
}

#[test]
fn one_bad_record_fails_the_whole_load() {
    let mut bad = raw_record("2", "physics");
    bad["CreatedAt"] = json!("last tuesday");
    let api = FakeApi::new(
        LoginScript::Token("abc"),
        FetchScript::Records(vec![raw_record("1", "physics"), bad]),
    );
    let mut gate = SessionGate::new(logged_in_store());

    let state = loader::load(&mut gate, &api);
    assert!(matches!(state, LoadState::Failed(_)));
    assert!(state.records().is_empty());
}

#[test]
fn login_then_load_round_trip() {
    let api = FakeApi::new(
        LoginScript::Token("fresh"),
        FetchScript::Records(vec![raw_record("9", "physics")]),
    );
    let mut gate = SessionGate::new(MemoryStore::new());
    assert_eq!(loader::load(&mut gate, &api), LoadState::Unauthenticated);

    assert_eq!(gate.login(&api, "pw"), LoginOutcome::Success);
    assert_eq!(loader::load(&mut gate, &api).records().len(), 1);
    assert_eq!(api.fetch_calls.get(), 1);
}
