//! Key-value persistence
//!
//! Settings are kept as string keys mapped to string values. The file-backed
//! store writes a flat JSON object:
//!
//! ```json
//! {
//!   "completed_intervals": "3",
//!   "focus_seconds": "1500"
//! }
//! ```
//!
//! Reads never fail: a missing or corrupt file behaves like an empty store.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage
///
/// Both operations are total; implementations that can fail report the
/// failure through logging and carry on.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// JSON file store, written through on every change
///
/// The file is the source of truth: every read goes back to disk and every
/// write merges into what is on disk, so edits made by another process are
/// seen and kept. The in-memory copy only answers reads while the file is
/// missing or unreadable.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`
    ///
    /// A missing file is an empty store. A file that exists but does not
    /// hold a JSON object is logged and replaced on the next write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let values = match load(path) {
            Ok(values) => values.unwrap_or_default(),
            Err(err @ StoreError::Json { .. }) => {
                tracing::warn!(error = %err, "ignoring unreadable settings");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all values to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content =
            serde_json::to_string_pretty(&self.values).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, content).map_err(io_err)
    }

    /// Values currently on disk, if the file can be read
    fn on_disk(&self) -> Option<BTreeMap<String, String>> {
        match load(&self.path) {
            Ok(values) => values,
            Err(err) => {
                tracing::debug!(error = %err, "using cached settings");
                None
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.on_disk() {
            Some(values) => values.get(key).cloned(),
            None => self.values.get(key).cloned(),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(values) = self.on_disk() {
            self.values = values;
        }
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            tracing::warn!(key, error = %err, "failed to persist setting");
        }
    }
}

/// Read the file at `path`; `None` when it does not exist
fn load(path: &Path) -> Result<Option<BTreeMap<String, String>>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_values(&content)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse a flat JSON object; non-string scalars are kept in their JSON form
/// so hand-edited numbers and booleans still read back.
fn parse_values(content: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: BTreeMap<String, Value> = serde_json::from_str(content)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new().with("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b"), None);

        store.set("b", "2".to_string());
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(&dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get("focus_seconds"), None);
    }

    #[test]
    fn test_set_writes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("completed_intervals", "3".to_string());
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("completed_intervals").as_deref(), Some("3"));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("focus_seconds"), None);

        // The next write replaces the bad file
        store.set("focus_seconds", "600".to_string());
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("focus_seconds").as_deref(), Some("600"));
    }

    #[test]
    fn test_hand_edited_scalars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "focus_seconds": 1800, "notifications_enabled": false, "nested": {} }"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("focus_seconds").as_deref(), Some("1800"));
        assert_eq!(store.get("notifications_enabled").as_deref(), Some("false"));
        assert_eq!(store.get("nested"), None);
    }

    #[test]
    fn test_sees_and_keeps_writes_from_another_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut running = JsonFileStore::open(&path).unwrap();
        running.set("completed_intervals", "1".to_string());

        let mut other = JsonFileStore::open(&path).unwrap();
        other.set("short_break_seconds", "420".to_string());

        assert_eq!(running.get("short_break_seconds").as_deref(), Some("420"));

        running.set("completed_intervals", "2".to_string());
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("short_break_seconds").as_deref(), Some("420"));
        assert_eq!(reopened.get("completed_intervals").as_deref(), Some("2"));
    }

    #[test]
    fn test_deleted_file_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("focus_seconds", "900".to_string());
        fs::remove_file(&path).unwrap();

        assert_eq!(store.get("focus_seconds").as_deref(), Some("900"));
    }

    #[test]
    fn test_flush_error_names_path() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = dir.path().join("settings.json");
        fs::create_dir_all(&path).unwrap();

        let store = JsonFileStore {
            path: path.clone(),
            values: BTreeMap::new(),
        };
        let err = store.flush().unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("settings.json"));
    }
}
