//! Durable local storage abstraction.
//!
//! This module defines the [`LocalStorage`] trait: a string key/value store that
//! survives restarts, used for the cached profile, the bearer token, theme
//! preferences and search history.
//!
//! # Design Philosophy
//!
//! The trait mirrors the small surface the stores actually use (`get`, `set`,
//! `remove`). Values are opaque strings; callers own their serialization.

use crate::domain::error::Result;

/// Abstraction over durable key/value backends.
///
/// Methods take `&self` so a single backend can be shared behind an `Arc`
/// between the session store, snippet store and search history.
///
/// # Implementations
///
/// - [`JsonStorage`](crate::storage::JsonStorage): JSON file with atomic writes (default)
/// - [`MemoryStorage`](crate::storage::MemoryStorage): process-local map for tests
///
/// # Examples
///
/// ```no_run
/// use snippetvault::storage::{keys, JsonStorage, LocalStorage};
/// use std::path::PathBuf;
///
/// let storage = JsonStorage::new(PathBuf::from("/tmp/snippetvault/storage.json"))?;
/// storage.set_item(keys::THEME_MODE, "dark")?;
/// assert_eq!(storage.get_item(keys::THEME_MODE)?.as_deref(), Some("dark"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait LocalStorage: Send + Sync {
    /// Reads the value stored under `key`, `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove_item(&self, key: &str) -> Result<()>;
}
