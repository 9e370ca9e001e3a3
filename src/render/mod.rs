//! Terminal rendering of the dashboard pages.
//!
//! Every function returns the finished text; printing is left to the CLI.
//! Colour is applied through `colored`, so `colored::control` decides whether
//! escape codes are emitted.

pub mod canvas;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::charts::{self, Layout};
use crate::config::schema::DisplayConfig;
use crate::records::{DataType, DatasetRecord};
use crate::view::{self, Tab};

/// Render any page.
pub fn page(tab: Tab, records: &[DatasetRecord], display: &DisplayConfig) -> String {
    match tab {
        Tab::Dashboard => dashboard(records),
        Tab::Physics | Tab::Cs => analytics(tab, &view::select(tab, records), display),
        Tab::AboutMe => about_me(),
        Tab::AboutSite => about_site(),
    }
}

/// Tab strip with the active tab highlighted.
pub fn tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|&tab| {
            if tab == active {
                format!("[{}]", tab.title()).bold().cyan().to_string()
            } else {
                format!(" {} ", tab.title()).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading(title: &str, subtitle: &str) -> String {
    format!(
        "{}\n{}\n{}\n\n",
        title.bold().cyan(),
        "=".repeat(60),
        subtitle.dimmed()
    )
}

fn date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub fn dashboard(records: &[DatasetRecord]) -> String {
    let summary = view::summarize(records);
    let mut out = heading(
        "Analytics Dashboard",
        "Physics and computer science datasets at a glance",
    );

    let last = summary
        .last_updated
        .as_ref()
        .map(date)
        .unwrap_or_else(|| "N/A".to_string());
    out.push_str(&format!("  {} {}\n", "Total Datasets:     ".bold(), summary.total));
    out.push_str(&format!("  {} {}\n", "Physics Experiments:".bold(), summary.physics));
    out.push_str(&format!(
        "  {} {}\n",
        "CS Analytics:       ".bold(),
        summary.computer_science
    ));
    out.push_str(&format!("  {} {}\n\n", "Last Updated:       ".bold(), last));

    out.push_str(&format!("{}\n", "Recent Datasets".bold().cyan()));
    if summary.recent.is_empty() {
        out.push_str(&format!("  {}\n", "No datasets available.".yellow()));
        return out;
    }

    out.push_str(&format!(
        "  {:<40} {:<18} {:>10}\n",
        "Title", "Type", "Created"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(70)));
    for (i, record) in summary.recent.iter().enumerate() {
        let line = format!(
            "  {:<40} {:<18} {:>10}",
            truncate(&record.title, 40),
            record.data_type.label(),
            date(&record.created_at),
        );
        if i % 2 == 0 {
            out.push_str(&format!("{line}\n"));
        } else {
            out.push_str(&format!("{}\n", line.dimmed()));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Analytics pages
// ---------------------------------------------------------------------------

fn analytics(tab: Tab, records: &[&DatasetRecord], display: &DisplayConfig) -> String {
    let (title, subtitle, kind) = match tab {
        Tab::Physics => (
            "Physics Analytics",
            "Particle physics and quantum measurements",
            "physics",
        ),
        _ => (
            "Computer Science Analytics",
            "Algorithm benchmarks, model training and network metrics",
            "computer science",
        ),
    };

    let mut out = heading(title, subtitle);
    if records.is_empty() {
        out.push_str(&format!(
            "  {}\n",
            format!("No data available for {kind} analytics.").yellow()
        ));
        return out;
    }

    for record in records {
        out.push_str(&record_section(record, display));
        out.push('\n');
    }
    out
}

/// Title block followed by the record's charts.
pub fn record_section(record: &DatasetRecord, display: &DisplayConfig) -> String {
    let mut out = format!("{}  {}\n", record.title.bold(), badge(&record.data_type));
    if !record.description.is_empty() {
        out.push_str(&format!("{}\n", record.description));
    }
    out.push_str(&format!(
        "{}\n\n",
        format!(
            "Created: {} | Updated: {}",
            date(&record.created_at),
            date(&record.updated_at)
        )
        .dimmed()
    ));
    out.push_str(&layout(&charts::layout_for(record), display));
    out
}

pub fn layout(layout: &Layout, display: &DisplayConfig) -> String {
    let mut out = String::new();
    for note in &layout.notes {
        out.push_str(&format!("  {}\n", note.italic()));
    }
    if !layout.notes.is_empty() {
        out.push('\n');
    }
    for chart in &layout.charts {
        out.push_str(&canvas::plot(chart, display.chart_width, display.chart_height));
        out.push('\n');
    }
    out
}

/// Coloured category label.
fn badge(data_type: &DataType) -> String {
    match data_type {
        DataType::Physics => data_type.label().blue().to_string(),
        DataType::ComputerScience => data_type.label().green().to_string(),
        DataType::Other(_) => data_type.label().dimmed().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

pub fn about_me() -> String {
    let mut out = heading(
        "About Me",
        "Turning scientific data into pictures people can read",
    );
    out.push_str(
        "My background runs from theoretical physics to production software.\n\
         Both fields taught me the same lesson: data only matters once someone\n\
         can see what it says. This dashboard is where I practise that.\n\n",
    );
    out.push_str(&format!("{}\n", "Values".bold().cyan()));
    for line in [
        "Customer focus: build the view the reader needs, not the one that is easy.",
        "Ownership: follow a dataset from the generator to the last pixel.",
        "Curiosity: every odd chart is a question worth asking.",
    ] {
        out.push_str(&format!("  - {line}\n"));
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "Execution Principles".bold().cyan()));
    for line in [
        "Ship small, verify often.",
        "Prefer plain data over clever abstractions.",
        "Make failure visible instead of silent.",
    ] {
        out.push_str(&format!("  - {line}\n"));
    }
    out
}

pub fn about_site() -> String {
    let mut out = heading(
        "About FresherPaint",
        "Analytics for physics and computer science data",
    );
    out.push_str(
        "FresherPaint shows pre-generated physics and computer science sample\n\
         datasets behind a shared-password login. Each dataset is drawn with the\n\
         chart that fits the shape of its data.\n\n",
    );
    out.push_str(&format!("{}\n", "Pages".bold().cyan()));
    for (name, what) in [
        ("Dashboard", "counts, last update and the five most recent datasets"),
        ("Physics", "Higgs decay, Bell test and cosmic-ray collision plots"),
        ("Computer Science", "algorithm runtimes, training curves and 5G metrics"),
    ] {
        out.push_str(&format!("  {:<18} {}\n", name.bold(), what));
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "Getting Started".bold().cyan()));
    out.push_str(
        "  fresherpaint serve            start the local backend\n\
         \x20 fresherpaint login           sign in with the site password\n\
         \x20 fresherpaint show physics    open a page\n",
    );
    out
}

/// Truncate a string to `max` characters, appending "..." if shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, tag: &str, payload: serde_json::Value) -> DatasetRecord {
        crate::records::normalize(&json!({
            "id": id,
            "title": format!("Dataset {id}"),
            "description": "sample",
            "data_type": tag,
            "data": payload,
            "created_at": "2024-01-15T08:00:00Z",
            "updated_at": "2024-02-01T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn empty_physics_page_says_so() {
        colored::control::set_override(false);
        let text = page(Tab::Physics, &[], &DisplayConfig::default());
        assert!(text.contains("No data available for physics analytics."));

        let text = page(Tab::Cs, &[], &DisplayConfig::default());
        assert!(text.contains("No data available for computer science analytics."));
    }

    #[test]
    fn cs_page_ignores_physics_records() {
        colored::control::set_override(false);
        let records = vec![record("1", "physics", json!({"collisions": []}))];
        let text = page(Tab::Cs, &records, &DisplayConfig::default());
        assert!(text.contains("No data available for computer science analytics."));
    }

    #[test]
    fn physics_page_lists_record_and_chart() {
        colored::control::set_override(false);
        let records = vec![record(
            "1",
            "physics",
            json!({"collisions": [{"momentum": 2.0, "angle": 45.0}]}),
        )];
        let text = page(Tab::Physics, &records, &DisplayConfig::default());
        assert!(text.contains("Dataset 1"));
        assert!(text.contains("Created: 2024-01-15 | Updated: 2024-02-01"));
        assert!(text.contains("Particle Collision Analysis"));
    }

    #[test]
    fn dashboard_shows_counts_and_last_update() {
        colored::control::set_override(false);
        let records = vec![
            record("1", "physics", json!({})),
            record("2", "computer_science", json!({})),
        ];
        let text = dashboard(&records);
        assert!(text.contains("Total Datasets:      2"));
        assert!(text.contains("Last Updated:        2024-02-01"));
        assert!(text.contains("Computer Science"));
    }

    #[test]
    fn empty_dashboard_uses_placeholder_date() {
        colored::control::set_override(false);
        let text = dashboard(&[]);
        assert!(text.contains("N/A"));
        assert!(text.contains("No datasets available."));
    }

    #[test]
    fn truncate_marks_cut_titles() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long dataset title", 10), "a very ...");
    }
}
