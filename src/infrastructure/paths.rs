//! Path helpers for locating the client's data directory.
//!
//! The data directory holds `storage.json` (durable key/value store), the
//! optional `snippetvault.toml` and the rotating log file.

use std::path::PathBuf;

const APP_DIR: &str = "snippetvault";

/// Returns the default data directory for SnippetVault.
///
/// Resolves to the platform data directory (`$XDG_DATA_HOME/snippetvault` or
/// `~/.local/share/snippetvault` on Linux). Falls back to `./.snippetvault`
/// when neither a data nor a home directory can be determined.
///
/// # Examples
///
/// ```
/// use snippetvault::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert!(data_dir.ends_with("snippetvault") || data_dir.ends_with(".snippetvault"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .map_or_else(|| PathBuf::from(".snippetvault"), |base| base.join(APP_DIR))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, or when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use snippetvault::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
