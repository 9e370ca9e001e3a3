/// Configuration system for fresherpaint.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::FresherConfig::default()`]
/// 2. **User global config**: `~/.fresherpaint/config.toml`
/// 3. **Project local config**: `.fresherpaint.toml` in the current directory
/// 4. **Environment variables**: `FRESHERPAINT_*` overrides (highest precedence)
///
/// Later layers replace earlier ones. Missing sections in a TOML file fall
/// back to the built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use fresherpaint::config;
///
/// let cfg = config::load();
/// let client = ApiClient::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::FresherConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Resolve the configuration. Each TOML file that parses replaces what came
/// before it; environment variables are applied last, field by field.
pub fn load() -> FresherConfig {
    let mut config = FresherConfig::default();

    if let Some(global) = load_toml_file(global_config_file()) {
        config = global;
    }
    if let Some(project) = load_toml_file(project_config_file()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Parse one config file; `None` when it is absent or unreadable.
///
/// Malformed files are reported on stderr and skipped.
fn load_toml_file(path: Option<PathBuf>) -> Option<FresherConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            eprintln!("[fresherpaint] ignoring malformed {}: {err}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

const HOME_DIR: &str = ".fresherpaint";

/// `~/.fresherpaint/config.toml`; `None` without a home directory.
pub fn global_config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HOME_DIR).join("config.toml"))
}

/// `.fresherpaint.toml` in the working directory.
pub fn project_config_file() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".fresherpaint.toml"))
}

fn require_global_file() -> Result<PathBuf> {
    global_config_file().context("no home directory to hold ~/.fresherpaint/config.toml")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Overlay `FRESHERPAINT_*` variables. Empty values are ignored for
/// strings:
/// - `FRESHERPAINT_API_BASE_URL`: backend base URL
/// - `FRESHERPAINT_API_TIMEOUT_MS`: request timeout
/// - `FRESHERPAINT_STORAGE_PATH`: key-value store file
/// - `FRESHERPAINT_COLOR`: ANSI colour output (`1`/`true`/`yes`/`on`)
/// - `FRESHERPAINT_LOG`: JSONL event log enabled
/// - `FRESHERPAINT_VERBOSE`: stderr diagnostics
/// - `FRESHERPAINT_SERVER_ADDR`: dev backend listen address
/// - `FRESHERPAINT_SITE_PASSWORD`: dev backend shared password
fn apply_env_overrides(config: &mut FresherConfig) {
    if let Ok(val) = std::env::var("FRESHERPAINT_API_BASE_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_STORAGE_PATH")
        && !val.is_empty()
    {
        config.storage.path = val;
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_COLOR") {
        config.display.color = flag(&val);
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_LOG") {
        config.logging.enabled = flag(&val);
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_VERBOSE") {
        config.logging.verbose = flag(&val);
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_SERVER_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("FRESHERPAINT_SITE_PASSWORD")
        && !val.is_empty()
    {
        config.server.password = val;
    }
}

/// `1`, `true`, `yes` and `on` (any case) switch a flag on; anything else off.
fn flag(val: &str) -> bool {
    ["1", "true", "yes", "on"]
        .iter()
        .any(|on| val.eq_ignore_ascii_case(on))
}

// ---------------------------------------------------------------------------
// config init | set | reset | show
// ---------------------------------------------------------------------------

/// Write the annotated defaults to the global file. An existing file is
/// only replaced with `force`.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = require_global_file()?;
    if path.exists() && !force {
        anyhow::bail!("{} exists; pass --force to replace it", path.display());
    }
    write_file(&path, FresherConfig::default_toml())?;
    Ok(path)
}

/// Overwrite the global file with the defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Update one `section.field` key in the global file, keeping the type of
/// the value already there. A missing file starts from the defaults.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = require_global_file()?;
    let current = if path.exists() {
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
    } else {
        toml::to_string_pretty(&FresherConfig::default())?
    };

    let mut doc: toml::Table = toml::from_str(&current)
        .with_context(|| format!("{} is not valid TOML", path.display()))?;
    update_key(&mut doc, key, value)?;
    write_file(&path, &toml::to_string_pretty(&doc)?)
}

/// Replace `key` in `doc`, parsing `raw` as the existing value's type.
fn update_key(doc: &mut toml::Table, key: &str, raw: &str) -> Result<()> {
    let (section, field) = key
        .split_once('.')
        .with_context(|| format!("config keys look like `section.field`, got '{key}'"))?;
    let slot = doc
        .get_mut(section)
        .and_then(toml::Value::as_table_mut)
        .with_context(|| format!("unknown config section '{section}'"))?
        .get_mut(field)
        .with_context(|| format!("unknown config key '{key}'"))?;

    *slot = match *slot {
        toml::Value::Boolean(_) => toml::Value::Boolean(flag(raw)),
        toml::Value::Integer(_) => toml::Value::Integer(
            raw.parse()
                .with_context(|| format!("'{key}' takes an integer, got '{raw}'"))?,
        ),
        toml::Value::Float(_) => toml::Value::Float(
            raw.parse()
                .with_context(|| format!("'{key}' takes a number, got '{raw}'"))?,
        ),
        _ => toml::Value::String(raw.to_string()),
    };
    Ok(())
}

/// The merged configuration, as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
