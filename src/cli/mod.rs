//! CLI command implementations for the fresherpaint dashboard.
//!
//! Provides subcommand handlers for:
//! - `fresherpaint login | logout | status`: session management
//! - `fresherpaint show [tab]`: render a dashboard page
//! - `fresherpaint tab <name>`: switch the active tab
//! - `fresherpaint health`: check backend, config and local state
//! - `fresherpaint serve`: run the local development backend
//! - `fresherpaint config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use colored::Colorize;

use crate::api::ApiClient;
use crate::config::{self, schema::FresherConfig, schema::expand_home};
use crate::events::EventLog;
use crate::loader::{self, LoadState};
use crate::render;
use crate::server::DevServer;
use crate::session::{LoginOutcome, SessionGate};
use crate::storage::FileStore;
use crate::view::{self, Tab};

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Resolved config plus the handles every command needs.
struct Context {
    config: FresherConfig,
    events: EventLog,
}

impl Context {
    fn load() -> Self {
        let config = config::load();
        let events = EventLog::from_config(&config.logging);
        Self { config, events }
    }

    fn gate(&self) -> SessionGate<FileStore> {
        let store = FileStore::open(expand_home(&self.config.storage.path));
        SessionGate::with_events(store, self.events.clone())
    }

    fn client(&self) -> ApiClient {
        ApiClient::from_config(&self.config.api)
    }
}

// ---------------------------------------------------------------------------
// fresherpaint login | logout | status
// ---------------------------------------------------------------------------

/// Exchange the site password for a session token.
pub fn run_login(password: Option<String>) -> Result<()> {
    let ctx = Context::load();
    let mut gate = ctx.gate();

    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    match gate.login(&ctx.client(), &password) {
        LoginOutcome::Success => {
            let expires = gate
                .session()
                .map(|s| format_remaining(s.remaining_secs()))
                .unwrap_or_default();
            println!("{} Logged in ({expires} remaining)", "✓".green().bold());
            Ok(())
        }
        LoginOutcome::Failure(message) => {
            println!("{} {}", "✗".red().bold(), message.red());
            bail!("login failed")
        }
    }
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Forget the stored session.
pub fn run_logout() -> Result<()> {
    let ctx = Context::load();
    let mut gate = ctx.gate();
    gate.logout();
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

/// Show session state and the active tab.
pub fn run_status() -> Result<()> {
    let ctx = Context::load();
    let gate = ctx.gate();

    println!("{}", "FresherPaint Status".bold().cyan());
    println!("{}", "=".repeat(50));

    match gate.session().filter(|_| gate.is_authenticated()) {
        Some(session) => println!(
            "  {} {} ({} remaining)",
            "Session:   ".bold(),
            "authenticated".green(),
            format_remaining(session.remaining_secs())
        ),
        None => println!(
            "  {} {}",
            "Session:   ".bold(),
            "not logged in".yellow()
        ),
    }
    println!(
        "  {} {}",
        "Active tab:".bold(),
        view::load_active_tab(gate.store())
    );
    println!("  {} {}", "Backend:   ".bold(), ctx.config.api.base_url);
    println!(
        "  {} {}",
        "Store:     ".bold(),
        gate.store().path().display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// fresherpaint show | tab
// ---------------------------------------------------------------------------

/// Render a page; without an argument, the last active one.
pub fn run_show(tab: Option<&str>, format: OutputFormat) -> Result<()> {
    let ctx = Context::load();
    let mut gate = ctx.gate();

    let tab = match tab {
        Some(name) => parse_tab(name)?,
        None => view::load_active_tab(gate.store()),
    };
    if let Err(err) = view::save_active_tab(gate.store_mut(), tab) {
        ctx.events.warn(&format!("could not remember active tab: {err:#}"));
    }

    if format == OutputFormat::Text {
        println!("{}\n", render::tab_bar(tab));
    }

    if matches!(tab, Tab::AboutMe | Tab::AboutSite) {
        if format == OutputFormat::Text {
            print!("{}", render::page(tab, &[], &ctx.config.display));
        }
        return Ok(());
    }

    if !gate.is_authenticated() {
        println!(
            "{}",
            "Not logged in. Run `fresherpaint login` to view analytics.".yellow()
        );
        return Ok(());
    }

    let records = match loader::load(&mut gate, &ctx.client()) {
        LoadState::Loaded(records) => records,
        LoadState::Unauthenticated => {
            println!(
                "{}",
                "Session expired. Run `fresherpaint login` to sign in again.".yellow()
            );
            return Ok(());
        }
        LoadState::Failed(message) => {
            ctx.events.warn(&format!("could not load analytics data: {message}"));
            Vec::new()
        }
    };

    match format {
        OutputFormat::Json => {
            let selected = view::select(tab, &records);
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
        OutputFormat::Text => print!("{}", render::page(tab, &records, &ctx.config.display)),
    }
    Ok(())
}

/// Persist the active tab without rendering.
pub fn run_tab(name: &str) -> Result<()> {
    let ctx = Context::load();
    let mut gate = ctx.gate();
    let tab = parse_tab(name)?;
    view::save_active_tab(gate.store_mut(), tab)?;
    println!("{} Active tab: {}", "✓".green().bold(), tab.title().bold());
    Ok(())
}

fn parse_tab(name: &str) -> Result<Tab> {
    match Tab::parse(name) {
        Some(tab) => Ok(tab),
        None => {
            let known: Vec<&str> = Tab::ALL.iter().map(|t| t.id()).collect();
            bail!("unknown tab {name:?} (expected one of: {})", known.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// fresherpaint health
// ---------------------------------------------------------------------------

/// Check backend reachability, config and local state.
pub fn run_health() -> Result<()> {
    let ctx = Context::load();
    let gate = ctx.gate();
    let client = ctx.client();

    println!("{}", "FresherPaint Health Check".bold().cyan());
    println!("{}", "=".repeat(50));

    // 1. Config
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Config file",
        true,
        if config_exists {
            "~/.fresherpaint/config.toml"
        } else {
            "using defaults"
        },
    );

    // 2. Backend
    let healthy = client.is_healthy();
    let detail = if healthy {
        format!("reachable at {}", client.base_url())
    } else {
        format!("not reachable at {}", client.base_url())
    };
    print_health_item("Backend", healthy, &detail);

    // 3. Session
    match gate.token().filter(|_| gate.is_authenticated()) {
        Some(token) if healthy => {
            let accepted = client.verify(&token).unwrap_or(false);
            print_health_item(
                "Session",
                accepted,
                if accepted {
                    "token accepted"
                } else {
                    "token rejected; log in again"
                },
            );
        }
        Some(_) => print_health_item("Session", true, "stored (not verified)"),
        None => print_health_item("Session", false, "not logged in"),
    }

    // 4. Event log
    let entries = ctx.events.read_all().len();
    print_health_item("Event log", true, &format!("{entries} entries"));

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<14} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// fresherpaint serve
// ---------------------------------------------------------------------------

/// Run the development backend in the foreground.
pub fn run_serve(addr: Option<&str>) -> Result<()> {
    let ctx = Context::load();
    let addr = addr.unwrap_or(&ctx.config.server.addr);
    let server = DevServer::bind(addr, &ctx.config.server, ctx.events.clone())?;

    println!("fresherpaint dev backend running at http://{addr}");
    println!("  API base: http://{addr}/api");
    println!("Press Ctrl+C to stop.\n");

    server.run()
}

// ---------------------------------------------------------------------------
// fresherpaint config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective FresherPaint Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.fresherpaint/config.toml", global_exists);
    print_source(".fresherpaint.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "FRESHERPAINT_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.fresherpaint/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Human-readable duration like `23h 59m`.
fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        return "expired".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
