/// End-to-end tests: the real `ureq` client against the development backend.
///
/// Each test binds its own server to an ephemeral port and runs it on a
/// background thread for the lifetime of the test process.
use std::thread;
use std::time::Duration;

use fresherpaint::api::{AnalyticsApi, ApiClient, FetchOutcome};
use fresherpaint::config::schema::ServerConfig;
use fresherpaint::events::EventLog;
use fresherpaint::loader::{self, LoadState};
use fresherpaint::server::DevServer;
use fresherpaint::session::{LoginOutcome, SessionGate};
use fresherpaint::storage::{AUTH_KEY, FileStore, KeyValueStore};
use fresherpaint::view::{self, Tab};

const PASSWORD: &str = "test-password";

/// Start a backend and return a client pointed at it.
fn start_backend() -> ApiClient {
    let config = ServerConfig {
        password: PASSWORD.to_string(),
        ..ServerConfig::default()
    };
    let server = DevServer::bind("127.0.0.1:0", &config, EventLog::disabled())
        .expect("bind dev server");
    let addr = server.local_addr().expect("server has an IP address");
    thread::spawn(move || server.run());
    ApiClient::new(&format!("http://{addr}/api"), Duration::from_secs(5))
}

#[test]
fn health_endpoint_reports_healthy() {
    let client = start_backend();
    assert!(client.is_healthy());
}

#[test]
fn wrong_password_surfaces_server_message() {
    let client = start_backend();
    let mut gate = SessionGate::new(fresherpaint::storage::MemoryStore::new());

    assert_eq!(
        gate.login(&client, "nope"),
        LoginOutcome::Failure("Invalid credentials".to_string())
    );
    assert!(!gate.is_authenticated());
}

#[test]
fn login_then_fetch_every_dataset() {
    let client = start_backend();
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("storage.json");

    let mut gate = SessionGate::new(FileStore::open(&store_path));
    assert_eq!(gate.login(&client, PASSWORD), LoginOutcome::Success);

    // A fresh gate over the same file restores the session.
    let mut gate = SessionGate::new(FileStore::open(&store_path));
    assert!(gate.is_authenticated());

    let state = loader::load(&mut gate, &client);
    let records = state.records();
    assert_eq!(records.len(), 6);
    assert_eq!(view::select(Tab::Physics, records).len(), 3);
    assert_eq!(view::select(Tab::Cs, records).len(), 3);
    assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[test]
fn token_is_verified_and_filtered_fetch_works() {
    let client = start_backend();
    let mut gate = SessionGate::new(fresherpaint::storage::MemoryStore::new());
    assert_eq!(gate.login(&client, PASSWORD), LoginOutcome::Success);
    let token = gate.token().unwrap();

    assert!(client.verify(&token).unwrap());
    assert!(!client.verify("not-a-token").unwrap());

    match client.fetch_by_type(&token, "physics").unwrap() {
        FetchOutcome::Envelope(env) => {
            let data = env.data.unwrap();
            assert_eq!(data.len(), 3);
            assert!(data.iter().all(|d| d["data_type"] == "physics"));
        }
        FetchOutcome::Unauthorized => panic!("token rejected"),
    }
}

#[test]
fn unknown_token_is_unauthorized_and_clears_session() {
    let client = start_backend();
    assert!(matches!(
        client.fetch_analytics("forged").unwrap(),
        FetchOutcome::Unauthorized
    ));

    // A session the backend never issued is dropped on first load.
    let mut store = fresherpaint::storage::MemoryStore::new();
    let expires = chrono::Utc::now().timestamp() + 3600;
    store
        .set(
            AUTH_KEY,
            &format!(r#"{{"token":"forged","expiresAt":{expires},"timestamp":0}}"#),
        )
        .unwrap();
    let mut gate = SessionGate::new(store);
    assert!(gate.is_authenticated());

    assert_eq!(loader::load(&mut gate, &client), LoadState::Unauthenticated);
    assert!(!gate.is_authenticated());
    assert!(gate.store().get(AUTH_KEY).is_none());
}

#[test]
fn unreachable_backend_is_a_network_error() {
    // Bind and drop to find a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = ApiClient::new(
        &format!("http://127.0.0.1:{port}/api"),
        Duration::from_secs(2),
    );

    assert!(!client.is_healthy());
    let mut gate = SessionGate::new(fresherpaint::storage::MemoryStore::new());
    assert_eq!(
        gate.login(&client, PASSWORD),
        LoginOutcome::Failure(fresherpaint::session::NETWORK_LOGIN_ERROR.to_string())
    );
}
