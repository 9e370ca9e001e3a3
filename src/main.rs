use anyhow::Result;
use clap::{Parser, Subcommand};

use fresherpaint::{cli, config};

#[derive(Debug, Parser)]
#[command(name = "fresherpaint")]
#[command(about = "Physics and computer science analytics dashboard for the terminal")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in with the site password
    Login {
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show session state and the active tab
    Status,
    /// Render a page: dashboard, physics, cs, about-me, about-site
    Show {
        /// Page to show (default: the last active tab)
        tab: Option<String>,
        /// Output format: text (default), json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Switch the active tab without rendering it
    Tab {
        /// dashboard, physics, cs, about-me or about-site
        name: String,
    },
    /// Check backend reachability, config and session
    Health,
    /// Run the local development backend
    Serve {
        /// Listen address (default: server.addr from config)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.fresherpaint/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `api.base_url http://host:8080/api`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    if !config::load().display.color {
        colored::control::set_override(false);
    }

    match app.command {
        Commands::Login { password } => cli::run_login(password),
        Commands::Logout => cli::run_logout(),
        Commands::Status => cli::run_status(),
        Commands::Show { tab, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_show(tab.as_deref(), fmt)
        }
        Commands::Tab { name } => cli::run_tab(&name),
        Commands::Health => cli::run_health(),
        Commands::Serve { addr } => cli::run_serve(addr.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
