//! Key/value settings persisted as a single JSON object.

use super::StorageError;
use crate::config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Write-through settings store.
///
/// Every `set` updates the in-memory map first and then rewrites the file.
/// Missing, unreadable, or corrupt files and entries read back as the
/// caller's default instead of failing.
#[derive(Debug, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Create a store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load settings from a profile directory
    pub fn open(profile_path: &Path) -> Self {
        let path = profile_path.join(config::SETTINGS_FILE);
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!("Ignoring corrupt settings file {:?}: {}", path, e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("Failed to read settings from {:?}: {}", path, e);
                Map::new()
            }
        };

        log::debug!("Loaded {} settings from {:?}", values.len(), path);

        Self {
            path: Some(path),
            values,
        }
    }

    /// Get a value, falling back to `default` when missing or of the wrong shape
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.values.get(key) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::debug!("Setting '{}' has unexpected shape ({}), using default", key, e);
                default
            }),
            None => default,
        }
    }

    /// Shorthand for string settings
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key, default.to_string())
    }

    /// Store a value and write the file.
    ///
    /// If writing fails the new value stays in memory and the error is returned
    /// so the caller can log it.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    /// Remove a value and write the file
    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Check whether a key has been stored
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, contents)?;
        log::trace!("Settings saved to {:?}", path);
        Ok(())
    }
}
