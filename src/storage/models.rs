//! On-disk record format and the well-known storage keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current version of the storage file format.
pub const STORAGE_VERSION: u32 = 1;

/// Keys used by the client in durable local storage.
pub mod keys {
    /// Serialized [`UserProfile`](crate::domain::UserProfile) of the signed-in user.
    pub const USER: &str = "sv_user";
    /// Bearer credential attached to every request.
    pub const ACCESS_TOKEN: &str = "sv_access_token";
    /// Theme mode preference: `light`, `dark` or `auto`.
    pub const THEME_MODE: &str = "sv_theme_mode";
    /// Accent color preference.
    pub const THEME_ACCENT: &str = "sv_theme_accent";
    /// JSON array of past search terms, most recent first.
    pub const SEARCH_HISTORY: &str = "snippet_search_history";
}

/// Top-level structure serialized to disk.
///
/// ```json
/// {
///   "version": 1,
///   "items": {
///     "sv_access_token": "eyJhbGciOi...",
///     "sv_theme_mode": "dark"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageData {
    /// Version of the storage format for future migrations.
    pub version: u32,

    /// Stored values keyed by name. Sorted so the file diffs cleanly.
    #[serde(default)]
    pub items: BTreeMap<String, String>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            items: BTreeMap::new(),
        }
    }
}
