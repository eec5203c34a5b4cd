//! Navigation seam used by the HTTP client's unauthorized redirect.

use std::sync::Mutex;

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

/// The piece of the view layer the transport is allowed to drive.
///
/// On an authorization failure the client asks where the user is and, unless
/// that is already the login view, sends them there.
pub trait Navigator: Send + Sync {
    /// Path of the view currently shown.
    fn current_path(&self) -> String;

    /// Switches to the view at `path`.
    fn navigate_to(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
///
/// Used by headless consumers and tests; `current_path` reflects the last
/// navigation.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
            visits: Mutex::new(Vec::new()),
        }
    }

    /// Every path navigated to, in order.
    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::starting_at("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn navigate_to(&self, path: &str) {
        if let Ok(mut current) = self.current.lock() {
            *current = path.to_string();
        }
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}
