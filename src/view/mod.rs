//! Active tab, tab persistence, and record selection.

use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::records::{DataType, DatasetRecord};
use crate::storage::{ACTIVE_TAB_KEY, KeyValueStore};

/// Number of records listed under "Recent Datasets" on the dashboard.
pub const RECENT_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// The five pages of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Dashboard,
    Physics,
    Cs,
    AboutMe,
    AboutSite,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Physics,
        Tab::Cs,
        Tab::AboutMe,
        Tab::AboutSite,
    ];

    /// Exact match against the persisted identifiers.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }

    /// Parse, falling back to the default tab.
    pub fn parse_or_default(id: Option<&str>) -> Self {
        id.and_then(Self::parse).unwrap_or_default()
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Physics => "physics",
            Self::Cs => "cs",
            Self::AboutMe => "about-me",
            Self::AboutSite => "about-site",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Physics => "Physics",
            Self::Cs => "Computer Science",
            Self::AboutMe => "About Me",
            Self::AboutSite => "About Site",
        }
    }

    /// The record tag a filtered tab selects.
    pub fn data_type(self) -> Option<DataType> {
        match self {
            Self::Physics => Some(DataType::Physics),
            Self::Cs => Some(DataType::ComputerScience),
            _ => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Last active tab; unknown or missing values give the default.
pub fn load_active_tab(store: &impl KeyValueStore) -> Tab {
    Tab::parse_or_default(store.get(ACTIVE_TAB_KEY).as_deref())
}

pub fn save_active_tab(store: &mut impl KeyValueStore, tab: Tab) -> Result<()> {
    store.set(ACTIVE_TAB_KEY, tab.id())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Records shown on `tab`, in input order.
///
/// The dashboard shows everything; the analytics tabs keep exact tag
/// matches; the about pages show none.
pub fn select(tab: Tab, records: &[DatasetRecord]) -> Vec<&DatasetRecord> {
    match tab {
        Tab::Dashboard => records.iter().collect(),
        Tab::Physics | Tab::Cs => {
            let wanted = tab.data_type();
            records
                .iter()
                .filter(|r| Some(&r.data_type) == wanted.as_ref())
                .collect()
        }
        Tab::AboutMe | Tab::AboutSite => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

/// Figures shown on the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardSummary<'a> {
    pub total: usize,
    pub physics: usize,
    pub computer_science: usize,
    /// Most recent `updated_at`, `None` when there are no records.
    pub last_updated: Option<DateTime<Utc>>,
    pub recent: Vec<&'a DatasetRecord>,
}

pub fn summarize(records: &[DatasetRecord]) -> DashboardSummary<'_> {
    let count = |t: &DataType| records.iter().filter(|r| &r.data_type == t).count();
    DashboardSummary {
        total: records.len(),
        physics: count(&DataType::Physics),
        computer_science: count(&DataType::ComputerScience),
        last_updated: records.iter().map(|r| r.updated_at).max(),
        recent: records.iter().take(RECENT_LIMIT).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
