//! Persisted search history.
//!
//! Past search terms are kept most-recent-first, deduplicated
//! case-insensitively and capped at [`MAX_HISTORY`]. The list lives under
//! [`keys::SEARCH_HISTORY`] as a JSON array and is independent of any single
//! snippet list fetch.

use super::backend::LocalStorage;
use super::models::keys;
use crate::domain::error::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

/// Maximum number of remembered search terms.
pub const MAX_HISTORY: usize = 8;

/// Most-recent-first list of past search terms.
pub struct SearchHistory {
    storage: Arc<dyn LocalStorage>,
    terms: Vec<String>,
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("terms", &self.terms)
            .finish_non_exhaustive()
    }
}

impl SearchHistory {
    /// Loads the history from storage.
    ///
    /// Unreadable or corrupt entries are treated as an empty history; the
    /// feature is a convenience and never blocks startup.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let terms = match storage.get_item(keys::SEARCH_HISTORY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "discarding corrupt search history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!(error = %e, "failed to read search history");
                Vec::new()
            }
        };

        let mut history = Self { storage, terms };
        history.terms.truncate(MAX_HISTORY);
        history
    }

    /// Remembered terms, most recent first.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Records a search term and persists the list.
    ///
    /// Blank terms are ignored. A term already present (ignoring case) moves to
    /// the front with its latest spelling.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn record(&mut self, term: &str) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let lowered = term.to_lowercase();
        self.terms.retain(|t| t.to_lowercase() != lowered);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(MAX_HISTORY);

        tracing::debug!(term = %term, count = self.terms.len(), "search term recorded");
        self.persist()
    }

    /// Forgets all terms.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed from storage.
    pub fn clear(&mut self) -> Result<()> {
        self.terms.clear();
        self.storage.remove_item(keys::SEARCH_HISTORY)
    }

    /// Returns remembered terms that fuzzy-match `input`, best match first.
    ///
    /// Ties keep recency order. An empty input returns the whole history.
    #[must_use]
    pub fn suggest(&self, input: &str) -> Vec<&str> {
        let input = input.trim();
        if input.is_empty() {
            return self.terms.iter().map(String::as_str).collect();
        }

        let matcher = SkimMatcherV2::default();
        let needle = input.to_lowercase();
        let mut scored: Vec<(i64, &str)> = self
            .terms
            .iter()
            .filter_map(|term| {
                matcher
                    .fuzzy_match(&term.to_lowercase(), &needle)
                    .map(|score| (score, term.as_str()))
            })
            .collect();

        // stable sort keeps recency order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, term)| term).collect()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.terms)?;
        self.storage.set_item(keys::SEARCH_HISTORY, &json)
    }
}
