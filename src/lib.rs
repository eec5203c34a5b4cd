//! SnippetVault: client data layer for the SnippetVault code-snippet manager.
//!
//! SnippetVault lets users store, tag, search, favorite, share and fork code
//! snippets through a REST API. This crate provides:
//! - A session store with durable identity and rehydration at startup
//! - A snippet store covering CRUD, tagging, favorites and public browsing
//! - A configured HTTP client with bearer auth and envelope normalization
//! - Local preferences and search history backed by a JSON file

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - SessionStore, SnippetStore, ProfileService       │
//! │  - watch-channel snapshots for views                │
//! └─────────────────────────────────────────────────────┘
//!         │                                     │
//! ┌───────────────────────┐         ┌───────────────────────┐
//! │ HTTP Layer (http/)    │         │ Storage Layer         │
//! │ - ApiClient           │ ──────► │ (storage/)            │
//! │ - Envelope adapter    │  token  │ - JSON file backend   │
//! │ - Navigator seam      │         │ - History, prefs      │
//! └───────────────────────┘         └───────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, Infrastructure, Observability              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! Layered, later wins:
//!
//! 1. Built-in defaults
//! 2. `snippetvault.toml` in the data directory, or an explicit `--config` file
//! 3. Environment: `SNIPPETVAULT_BACKEND_URL`, `SNIPPETVAULT_DATA_DIR`,
//!    `SNIPPETVAULT_TRACE_LEVEL`, `SNIPPETVAULT_SEARCH_DEBOUNCE_MS`,
//!    `SNIPPETVAULT_REQUEST_TIMEOUT_SECS`
//!
//! ```toml
//! base_url = "https://vault.example.com/api/v1"
//! trace_level = "debug"
//! search_debounce_ms = 300
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use snippetvault::http::RecordingNavigator;
//! use snippetvault::{initialize, Config};
//! use std::sync::Arc;
//!
//! # async fn run() -> snippetvault::Result<()> {
//! let config = Config::load(None)?;
//! let ctx = initialize(&config, Arc::new(RecordingNavigator::default()))?;
//!
//! ctx.session.login("ada@example.com", "hunter2").await;
//! if let Some(message) = ctx.session.snapshot().error {
//!     eprintln!("{message}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod observability;
pub mod storage;

pub use app::{AppContext, ProfileService, SessionState, SessionStore, SnippetListState, SnippetStore};
pub use domain::{Result, Snippet, SnippetVaultError, UserProfile};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default REST endpoint, matching a locally running server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Config file looked up in the data directory.
pub const CONFIG_FILE: &str = "snippetvault.toml";

/// Durable storage file inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";

const ENV_BACKEND_URL: &str = "SNIPPETVAULT_BACKEND_URL";
const ENV_DATA_DIR: &str = "SNIPPETVAULT_DATA_DIR";
const ENV_TRACE_LEVEL: &str = "SNIPPETVAULT_TRACE_LEVEL";
const ENV_DEBOUNCE_MS: &str = "SNIPPETVAULT_SEARCH_DEBOUNCE_MS";
const ENV_TIMEOUT_SECS: &str = "SNIPPETVAULT_REQUEST_TIMEOUT_SECS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API root, without trailing slash. Default: [`DEFAULT_BASE_URL`]
    pub base_url: String,

    /// Directory holding `storage.json`, `snippetvault.toml` and the log file.
    pub data_dir: PathBuf,

    /// Tracing level or `EnvFilter` directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Delay between the last keystroke and a search request. Default: 250
    pub search_debounce_ms: u64,

    /// Per-request timeout. Default: 30
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: infrastructure::get_data_dir(),
            trace_level: None,
            search_debounce_ms: 250,
            request_timeout_secs: 30,
        }
    }
}

/// On-disk shape of `snippetvault.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    data_dir: Option<String>,
    trace_level: Option<String>,
    search_debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Loads configuration from defaults, the config file and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` cannot be read, or if any
    /// config file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let env: BTreeMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("SNIPPETVAULT_"))
            .collect();
        Self::resolve(config_path, &env)
    }

    /// Layers the config file and `env` over the defaults.
    ///
    /// Without an explicit path, `snippetvault.toml` is read from the data
    /// directory (as overridden by `SNIPPETVAULT_DATA_DIR`) when it exists.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use snippetvault::Config;
    ///
    /// let mut env = BTreeMap::new();
    /// env.insert("SNIPPETVAULT_BACKEND_URL".to_string(), "https://vault.example.com/api/v1/".to_string());
    /// env.insert("SNIPPETVAULT_DATA_DIR".to_string(), "/tmp/snippetvault-doc-missing".to_string());
    /// env.insert("SNIPPETVAULT_SEARCH_DEBOUNCE_MS".to_string(), "not-a-number".to_string());
    ///
    /// let config = Config::resolve(None, &env).unwrap();
    /// assert_eq!(config.base_url, "https://vault.example.com/api/v1");
    /// assert_eq!(config.search_debounce_ms, 250);
    /// ```
    pub fn resolve(config_path: Option<&Path>, env: &BTreeMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = env.get(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = infrastructure::expand_tilde(dir.trim());
        }

        let file = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => Some(config.data_dir.join(CONFIG_FILE)).filter(|path| path.exists()),
        };
        if let Some(path) = file {
            config.apply_file(&path)?;
        }

        config.apply_env(env);
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        tracing::debug!(
            base_url = %config.base_url,
            data_dir = ?config.data_dir,
            "configuration resolved"
        );
        Ok(config)
    }

    /// Path of the durable storage file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            SnippetVaultError::Config(format!("invalid config file {}: {e}", path.display()))
        })?;

        if let Some(base_url) = file.base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(data_dir) = file.data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = infrastructure::expand_tilde(data_dir.trim());
        }
        if file.trace_level.is_some() {
            self.trace_level = file.trace_level;
        }
        if let Some(ms) = file.search_debounce_ms {
            self.search_debounce_ms = ms;
        }
        if let Some(secs) = file.request_timeout_secs.filter(|s| *s > 0) {
            self.request_timeout_secs = secs;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &BTreeMap<String, String>) {
        let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(base_url) = get(ENV_BACKEND_URL) {
            self.base_url = base_url.to_string();
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = infrastructure::expand_tilde(dir);
        }
        if let Some(level) = get(ENV_TRACE_LEVEL) {
            self.trace_level = Some(level.to_string());
        }
        if let Some(ms) = get(ENV_DEBOUNCE_MS).and_then(|v| v.parse::<u64>().ok()) {
            self.search_debounce_ms = ms;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            self.request_timeout_secs = secs;
        }
    }
}

/// Opens durable storage under the data directory and wires every store.
///
/// # Errors
///
/// Returns an error if the storage file is unreadable or corrupt, or if the
/// HTTP client cannot be built.
pub fn initialize(config: &Config, navigator: Arc<dyn http::Navigator>) -> Result<AppContext> {
    tracing::debug!("initializing snippetvault client");

    let storage = storage::JsonStorage::new(config.storage_path())?;
    AppContext::new(config, Arc::new(storage), navigator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_then_env_layering() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "base_url = \"http://file.example/api\"\ntrace_level = \"debug\"\nsearch_debounce_ms = 400\n",
        )
        .unwrap();

        let mut env = BTreeMap::new();
        env.insert(ENV_DATA_DIR.to_string(), dir.path().display().to_string());
        env.insert(ENV_TRACE_LEVEL.to_string(), "warn".to_string());

        let config = Config::resolve(None, &env).unwrap();
        assert_eq!(config.base_url, "http://file.example/api");
        assert_eq!(config.trace_level.as_deref(), Some("warn"));
        assert_eq!(config.search_debounce_ms, 400);
        assert_eq!(config.storage_path(), dir.path().join(STORAGE_FILE));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::resolve(Some(&missing), &BTreeMap::new()).is_err());
    }

    #[test]
    fn malformed_config_reports_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "base_url = [").unwrap();

        let err = Config::resolve(Some(&path), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SnippetVaultError::Config(_)));
    }
}
