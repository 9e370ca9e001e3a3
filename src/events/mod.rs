//! Structured JSONL event log of session and fetch activity.
//!
//! Every login attempt, logout, analytics fetch and dev-server request is
//! appended as one JSON line to `~/.fresherpaint/events.jsonl` (configurable
//! via `[logging]`). Human-facing diagnostics go to stderr with a
//! `[fresherpaint]` prefix.
//!
//! All writes are best-effort; a failing log never changes the outcome of
//! the operation being logged.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::{LoggingConfig, expand_home};

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionRestored,
    SessionDiscarded,
    LoginSucceeded,
    LoginFailed,
    Logout,
    FetchSucceeded,
    FetchFailed,
    FetchUnauthorized,
    ServerRequest,
}

/// One line in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Number of records involved (fetch events).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub records: Option<usize>,
    /// HTTP status (server events).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            message: None,
            records: None,
            status: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn records(mut self, count: usize) -> Self {
        self.records = Some(count);
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Handle to the event log and stderr diagnostics.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
    verbose: bool,
}

impl EventLog {
    /// Build from the resolved `[logging]` section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: config.enabled.then(|| expand_home(&config.path)),
            verbose: config.verbose,
        }
    }

    /// A log that records nothing and prints only warnings.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            verbose: false,
        }
    }

    /// Append an event. Best-effort.
    pub fn record(&self, event: Event) {
        if self.verbose {
            self.debug(&format!(
                "{:?}{}",
                event.kind,
                event
                    .message
                    .as_deref()
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            ));
        }
        let _ = self.append(&event);
    }

    /// Print a warning to stderr.
    pub fn warn(&self, message: &str) {
        eprintln!("[fresherpaint] {message}");
    }

    /// Print a diagnostic to stderr when verbose logging is on.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            eprintln!("[fresherpaint] {message}");
        }
    }

    /// Read every well-formed event; malformed lines are skipped.
    pub fn read_all(&self) -> Vec<Event> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<Event>(&line).ok())
            .collect()
    }

    fn append(&self, event: &Event) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_and_reads_back_events() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::at(dir.path().join("logs").join("events.jsonl"));

        log.record(Event::new(EventKind::LoginFailed).message("Invalid credentials"));
        log.record(Event::new(EventKind::FetchSucceeded).records(6));

        let events = log.read_all();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::LoginFailed);
        assert_eq!(events[0].message.as_deref(), Some("Invalid credentials"));
        assert_eq!(events[1].records, Some(6));
    }

    #[test]
    fn skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        fs::write(
            &path,
            "garbage\n{\"timestamp\":\"t\",\"kind\":\"logout\"}\n",
        )
        .unwrap();

        let events = EventLog::at(&path).read_all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Logout);
    }

    #[test]
    fn disabled_log_is_silent() {
        let log = EventLog::disabled();
        log.record(Event::new(EventKind::Logout));
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn from_config_respects_enabled_flag() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(EventLog::from_config(&config).path.is_none());
    }
}
