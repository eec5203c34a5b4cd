//! Durable local storage for session identity, preferences and search history.
//!
//! # Modules
//!
//! - `backend`: [`LocalStorage`] trait abstraction over key/value backends
//! - `json`: JSON file backend with atomic writes
//! - `memory`: in-memory backend for tests
//! - `models`: on-disk format and well-known keys
//! - `history`: most-recent-first search history
//! - `preferences`: theme mode and accent

pub mod backend;
pub mod history;
pub mod json;
mod memory;
pub mod models;
pub mod preferences;

pub use backend::LocalStorage;
pub use history::{SearchHistory, MAX_HISTORY};
pub use json::JsonStorage;
pub use memory::MemoryStorage;
pub use models::{keys, StorageData};
pub use preferences::{Preferences, ThemeMode};
