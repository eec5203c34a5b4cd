//! JSON file-based storage backend.
//!
//! This module provides a simple, human-readable storage implementation using
//! JSON serialization. It uses atomic file writes (write-to-temp + rename) to
//! prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(log n) - the whole file is loaded into memory once
//! - **Write**: O(n) - serializes and writes the entire map on every change
//! - **Best for**: a handful of small keys written on login, logout and search

use crate::domain::error::{Result, SnippetVaultError};
use crate::storage::backend::LocalStorage;
use crate::storage::models::StorageData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

struct Inner {
    /// In-memory copy of the file, loaded on creation.
    data: StorageData,

    /// Set when a write to disk is pending or failed.
    dirty: bool,
}

/// JSON file storage backend.
///
/// Keeps every key in memory and persists the whole map after each mutation.
///
/// # Thread Safety
///
/// The in-memory map sits behind a `Mutex`, so the backend is `Send + Sync` and
/// can be shared between stores. The lock is never held across an `.await`.
pub struct JsonStorage {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    inner: Mutex<Inner>,
}

impl JsonStorage {
    /// Creates or opens a JSON storage backend.
    ///
    /// If the file exists, loads existing data. Otherwise starts empty.
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty storage");
            StorageData::default()
        };

        tracing::debug!(item_count = data.items.len(), "storage initialized");

        Ok(Self {
            file_path,
            inner: Mutex::new(Inner { data, dirty: false }),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads storage data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| SnippetVaultError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(
            version = data.version,
            items = data.items.len(),
            "loaded storage data"
        );

        Ok(data)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| SnippetVaultError::Storage("storage lock poisoned".to_string()))
    }

    /// Saves storage data to disk using atomic write.
    ///
    /// Writes to a temporary file first, then renames it over the target path,
    /// so the file is never left half-written.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    fn save_to_file(file_path: &Path, inner: &mut Inner) -> Result<()> {
        if !inner.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&inner.data)
            .map_err(|e| SnippetVaultError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, file_path)?;

        inner.dirty = false;
        tracing::trace!(path = ?file_path, "storage saved");
        Ok(())
    }
}

impl LocalStorage for JsonStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.data.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_set_item", key = %key).entered();

        let mut inner = self.lock()?;
        if inner.data.items.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        inner.data.items.insert(key.to_string(), value.to_string());
        inner.dirty = true;
        Self::save_to_file(&self.file_path, &mut inner)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_remove_item", key = %key).entered();

        let mut inner = self.lock()?;
        if inner.data.items.remove(key).is_none() {
            return Ok(());
        }
        inner.dirty = true;
        Self::save_to_file(&self.file_path, &mut inner)
    }
}

impl Drop for JsonStorage {
    /// Retries a pending write that failed earlier.
    fn drop(&mut self) {
        let Ok(inner) = self.inner.get_mut() else {
            return;
        };
        if inner.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = Self::save_to_file(&self.file_path, inner) {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::keys;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let storage = JsonStorage::new(path.clone()).unwrap();
            storage.set_item(keys::ACCESS_TOKEN, "tok").unwrap();
            storage.set_item(keys::THEME_MODE, "dark").unwrap();
            storage.remove_item(keys::THEME_MODE).unwrap();
        }

        let reopened = JsonStorage::new(path).unwrap();
        assert_eq!(reopened.get_item(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get_item(keys::THEME_MODE).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonStorage::new(path).err().unwrap();
        assert!(matches!(err, SnippetVaultError::Storage(_)));
    }

    #[test]
    fn removing_absent_key_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = JsonStorage::new(path.clone()).unwrap();
        storage.remove_item(keys::USER).unwrap();
        assert!(!path.exists());
        assert_eq!(storage.path(), path.as_path());
    }
}
