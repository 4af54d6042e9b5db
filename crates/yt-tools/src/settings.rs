//! Persisted key-value settings.
//!
//! A single JSON object on disk, keys namespaced with [`KEY_PREFIX`].
//! Reads and writes are synchronous and unlocked; failures are logged and
//! swallowed so a broken settings file never blocks a user action.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::types::{ToolsError, ToolsResult};

/// Prefix applied to every stored key.
pub const KEY_PREFIX: &str = "yt-tools-";

/// Key-value settings backed by a JSON file.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value, returning `default` when absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                tracing::error!("Storage get error: {e}");
                default
            }
        }
    }

    /// Store a value. Errors are logged, not returned.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            tracing::error!("Storage set error: {e}");
        }
    }

    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> ToolsResult<Option<T>> {
        let map = self.load()?;
        match map.get(&prefixed(key)) {
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
            None => Ok(None),
        }
    }

    pub fn try_set<T: Serialize>(&self, key: &str, value: &T) -> ToolsResult<()> {
        let mut map = self.load()?;
        map.insert(prefixed(key), serde_json::to_value(value)?);
        self.save(&map)
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> ToolsResult<bool> {
        let mut map = self.load()?;
        let existed = map.remove(&prefixed(key)).is_some();
        if existed {
            self.save(&map)?;
        }
        Ok(existed)
    }

    /// All stored entries with the prefix stripped, sorted by key.
    pub fn entries(&self) -> ToolsResult<Vec<(String, Value)>> {
        Ok(self
            .load()?
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(KEY_PREFIX).map(|k| (k.to_string(), v)))
            .collect())
    }

    fn load(&self) -> ToolsResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ToolsError::Settings(format!("{} is not a settings object: {e}", self.path.display()))
        })
    }

    fn save(&self, map: &BTreeMap<String, Value>) -> ToolsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

fn prefixed(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("nested/settings.json"))
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        assert_eq!(store.get("skippedVersion", String::from("none")), "none");
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        store.set("skippedVersion", &"1.2.0");
        assert_eq!(store.get("skippedVersion", String::new()), "1.2.0");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"yt-tools-skippedVersion\""));
    }

    #[test]
    fn test_corrupt_file_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(&path);

        assert_eq!(store.get("anything", 7u32), 7);
        store.set("anything", &1u32);
        assert!(matches!(store.try_get::<u32>("anything"), Err(ToolsError::Settings(_))));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        store.set("count", &"not a number");
        assert_eq!(store.get("count", 3u32), 3);
    }

    #[test]
    fn test_entries_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        store.set("b", &2);
        store.set("a", &1);

        let keys: Vec<String> = store.entries().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.entries().unwrap().len(), 1);
    }
}
