//! Wiring of the stores around one shared transport and storage backend.

use super::profile::ProfileService;
use super::search::Debouncer;
use super::session::SessionStore;
use super::snippets::SnippetStore;
use crate::domain::error::Result;
use crate::http::{ApiClient, Navigator};
use crate::storage::{LocalStorage, Preferences, SearchHistory};
use crate::Config;
use std::sync::Arc;
use std::time::Duration;

/// Everything a view layer needs, built once per process.
///
/// The session store is constructed before anything can issue a request, so
/// its unauthorized hook is always in place.
pub struct AppContext {
    pub storage: Arc<dyn LocalStorage>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub snippets: Arc<SnippetStore>,
    pub profile: ProfileService,
    pub debouncer: Debouncer,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.api)
            .field("session", &self.session)
            .field("snippets", &self.snippets)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Builds the transport and every store on top of `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &Config,
        storage: Arc<dyn LocalStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let _span = tracing::debug_span!("app_context_new", base_url = %config.base_url).entered();

        let api = Arc::new(ApiClient::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
            Arc::clone(&storage),
            navigator,
        )?);
        let session = Arc::new(SessionStore::new(Arc::clone(&api), Arc::clone(&storage)));
        let snippets = Arc::new(SnippetStore::new(Arc::clone(&api)));
        let profile = ProfileService::new(Arc::clone(&api), Arc::clone(&session));
        let debouncer = Debouncer::new(Duration::from_millis(config.search_debounce_ms));

        tracing::debug!(verified = session.snapshot().is_verified, "app context ready");

        Ok(Self {
            storage,
            api,
            session,
            snippets,
            profile,
            debouncer,
        })
    }

    /// Loads the persisted search history.
    #[must_use]
    pub fn search_history(&self) -> SearchHistory {
        SearchHistory::load(Arc::clone(&self.storage))
    }

    /// Loads the persisted theme preferences.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::load(self.storage.as_ref())
    }
}
