//! Local key-value persistence for client state.
//!
//! Everything the dashboard remembers across invocations (the session token
//! and the last active tab) goes through the [`KeyValueStore`] trait. The
//! CLI uses a [`FileStore`] backed by `~/.fresherpaint/storage.json`; tests
//! inject a [`MemoryStore`].
//!
//! Values are plain strings. Callers own their encoding (the session is
//! stored as a JSON document, the tab as its bare identifier).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Key holding the serialized session object.
pub const AUTH_KEY: &str = "fresherpaint_auth";

/// Key holding the last active tab identifier.
pub const ACTIVE_TAB_KEY: &str = "fresherpaint_active_tab";

/// String key-value store with `get`/`set`/`remove`.
pub trait KeyValueStore {
    /// Return the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, used by tests and as a fallback when no home directory
/// is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON-file-backed store.
///
/// The whole map is read once on [`open`](FileStore::open) and rewritten on
/// every mutation. An unreadable or malformed file is treated as empty and
/// replaced on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if present.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(&self.entries).context("failed to serialize store")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> Option<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path);
        store.set(ACTIVE_TAB_KEY, "physics").unwrap();
        store.set(AUTH_KEY, r#"{"token":"t"}"#).unwrap();

        let mut reopened = FileStore::open(&path);
        assert_eq!(reopened.get(ACTIVE_TAB_KEY).as_deref(), Some("physics"));
        reopened.remove(AUTH_KEY).unwrap();

        let again = FileStore::open(&path);
        assert_eq!(again.get(AUTH_KEY), None);
        assert_eq!(again.get(ACTIVE_TAB_KEY).as_deref(), Some("physics"));
    }

    #[test]
    fn file_store_treats_garbage_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get(AUTH_KEY), None);
        store.set("k", "v").unwrap();
        assert_eq!(FileStore::open(&path).get("k").as_deref(), Some("v"));
    }
}
