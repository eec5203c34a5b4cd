//! Presentation preferences persisted next to the session.
//!
//! Theme mode lives under [`keys::THEME_MODE`] and the accent color under
//! [`keys::THEME_ACCENT`]. Unknown stored values fall back to the defaults.

use super::backend::LocalStorage;
use super::models::keys;
use crate::domain::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accent used when none has been chosen.
pub const DEFAULT_ACCENT: &str = "indigo";

/// Color scheme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    /// Follow the system color scheme.
    Auto,
}

impl ThemeMode {
    /// Flips between light and dark. `Auto` toggles to `Dark`.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light | Self::Auto => Self::Dark,
        }
    }

    /// Resolves `Auto` against the system preference.
    #[must_use]
    pub const fn resolve(self, system_prefers_dark: bool) -> Self {
        match self {
            Self::Auto if system_prefers_dark => Self::Dark,
            Self::Auto => Self::Light,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown theme mode: {other}")),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme mode and accent color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub mode: ThemeMode,
    pub accent: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            mode: ThemeMode::default(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

impl Preferences {
    /// Reads preferences, falling back to defaults for missing or invalid values.
    pub fn load(storage: &dyn LocalStorage) -> Self {
        let mode = storage
            .get_item(keys::THEME_MODE)
            .ok()
            .flatten()
            .and_then(|raw| {
                raw.parse::<ThemeMode>()
                    .map_err(|e| tracing::debug!(error = %e, "ignoring stored theme mode"))
                    .ok()
            })
            .unwrap_or_default();

        let accent = storage
            .get_item(keys::THEME_ACCENT)
            .ok()
            .flatten()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACCENT.to_string());

        Self { mode, accent }
    }

    /// Persists both preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if storage rejects the write.
    pub fn save(&self, storage: &dyn LocalStorage) -> Result<()> {
        storage.set_item(keys::THEME_MODE, self.mode.as_str())?;
        storage.set_item(keys::THEME_ACCENT, &self.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn invalid_stored_mode_falls_back_to_light() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::THEME_MODE, "sepia").unwrap();
        let prefs = Preferences::load(&storage);
        assert_eq!(prefs.mode, ThemeMode::Light);
        assert_eq!(prefs.accent, DEFAULT_ACCENT);
    }

    #[test]
    fn save_then_load() {
        let storage = MemoryStorage::new();
        let prefs = Preferences {
            mode: ThemeMode::Auto,
            accent: "emerald".into(),
        };
        prefs.save(&storage).unwrap();
        assert_eq!(Preferences::load(&storage), prefs);
    }

    #[test]
    fn toggle_and_resolve() {
        assert_eq!(ThemeMode::Light.toggle(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggle(), ThemeMode::Light);
        assert_eq!(ThemeMode::Auto.resolve(true), ThemeMode::Dark);
        assert_eq!(ThemeMode::Auto.resolve(false), ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.resolve(false), ThemeMode::Dark);
    }
}
