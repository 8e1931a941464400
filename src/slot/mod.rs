//! Key-value slot kept next to the database, outside of it.
//!
//! Holds state that is per-device and disposable: daily completion marks and
//! cached balances. The whole slot is one JSON object on disk, rewritten
//! atomically on every change.

pub mod daily;

pub use daily::DailyTracker;

use crate::error::{DeskError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Slot key for daily completion state.
pub const DAILY_TASKS_KEY: &str = "dailyTasks";

/// Slot key for cached wallet balances.
pub const BALANCES_KEY: &str = "balances";

/// A JSON file mapping string keys to JSON values.
#[derive(Debug, Clone)]
pub struct LocalSlot {
    path: PathBuf,
}

impl LocalSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `key`, or `default` when the key (or the whole file) is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the stored value does
    /// not match `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        let mut entries = self.load()?;
        match entries.remove(key) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(default),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.store(&entries)
    }

    /// Drop `key`. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or rewritten.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.load()?;
        let removed = entries.remove(key).is_some();
        if removed {
            self.store(&entries)?;
        }
        Ok(removed)
    }

    /// Keys currently present, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.keys().cloned().collect())
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(DeskError::Config(format!(
                "Slot file {} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    fn store(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), keys = entries.len(), "Slot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_defaults() {
        let temp = TempDir::new().unwrap();
        let slot = LocalSlot::new(temp.path().join("slot.json"));
        let value: Vec<String> = slot.get("anything", vec!["x".to_string()]).unwrap();
        assert_eq!(value, vec!["x"]);
        assert!(slot.keys().unwrap().is_empty());
    }

    #[test]
    fn set_then_get_and_remove() {
        let temp = TempDir::new().unwrap();
        let slot = LocalSlot::new(temp.path().join("nested").join("slot.json"));
        slot.set("answer", &42_u32).unwrap();
        slot.set("other", "text").unwrap();

        assert_eq!(slot.get("answer", 0_u32).unwrap(), 42);
        assert!(slot.remove("answer").unwrap());
        assert!(!slot.remove("answer").unwrap());
        assert_eq!(slot.keys().unwrap(), vec!["other"]);
        assert!(!temp.path().join("nested").join("slot.json.tmp").exists());
    }

    #[test]
    fn non_object_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("slot.json");
        fs::write(&path, "[1, 2]").unwrap();
        let slot = LocalSlot::new(path);
        assert!(slot.get("k", 0_u8).is_err());
    }
}
