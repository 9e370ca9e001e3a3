/// Configuration schema and defaults for fresherpaint.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[storage]`, `[display]`, `[logging]`, and `[server]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

/// Default backend base URL (local development backend).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default shared password accepted by the development backend.
pub const DEFAULT_SITE_PASSWORD: &str = "source.tide.white";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level fresherpaint configuration.
///
/// Maps directly to the `~/.fresherpaint/config.toml` and
/// `.fresherpaint.toml` file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FresherConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Analytics backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

/// Local key-value store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the store file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.fresherpaint/storage.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Terminal rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Whether to emit ANSI colours.
    pub color: bool,
    /// Plot area width in characters.
    pub chart_width: usize,
    /// Plot area height in rows.
    pub chart_height: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            chart_width: 60,
            chart_height: 12,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the JSONL event log is written.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
    /// Echo debug diagnostics to stderr.
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.fresherpaint/events.jsonl".to_string(),
            verbose: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Development backend settings (`fresherpaint serve`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Shared site password.
    pub password: String,
    /// Lifetime of issued tokens, in hours.
    pub token_ttl_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            password: DEFAULT_SITE_PASSWORD.to_string(),
            token_ttl_hours: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    std::path::PathBuf::from(path)
}

impl FresherConfig {
    /// Annotated default config written by `fresherpaint config init`.
    pub fn default_toml() -> &'static str {
        r#"# fresherpaint configuration
#
# Layers: built-in defaults -> ~/.fresherpaint/config.toml ->
# .fresherpaint.toml -> FRESHERPAINT_* environment variables.

[api]
# Base URL of the analytics backend (override: FRESHERPAINT_API_BASE_URL)
base_url = "http://localhost:8080/api"
timeout_ms = 10000

[storage]
# Key-value store holding the session token and the active tab
path = "~/.fresherpaint/storage.json"

[display]
color = true
chart_width = 60
chart_height = 12

[logging]
enabled = true
path = "~/.fresherpaint/events.jsonl"
verbose = false

[server]
# Development backend (fresherpaint serve)
addr = "127.0.0.1:8080"
password = "source.tide.white"
token_ttl_hours = 24
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
