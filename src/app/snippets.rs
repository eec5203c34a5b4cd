//! Snippet store: the current page of the user's snippets plus every snippet
//! operation the views call.
//!
//! # Merge Policy
//!
//! - List fetches (`get_snippets`, `get_favorite_snippets`) replace the list and
//!   pagination wholesale, in server order.
//! - Mutations patch the local list from the server's confirmation, never
//!   before it: create prepends, update replaces in place, delete removes,
//!   favorite patches two fields.
//! - Read-only calls (by id, tags, stats, public, fork) never touch the list.
//!
//! # Stale Responses
//!
//! Each list fetch takes a sequence number. A response is applied only if no
//! newer list fetch was issued meanwhile, so a slow stale search cannot
//! overwrite a fresher one.

use crate::domain::error::Result;
use crate::domain::{
    FavoriteStatus, Pagination, Snippet, SnippetDraft, SnippetPage, SnippetQuery, SnippetStats,
    TagStat, DEFAULT_BROWSE_LIMIT,
};
use crate::http::ApiClient;
use serde::Deserialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

const CREATE_FAILED: &str = "Creating snippet failed!";
const FETCH_FAILED: &str = "Snippet fetching failed!";
const FETCH_BY_ID_FAILED: &str = "SnippetByID fetching failed!";
const UPDATE_FAILED: &str = "Update snippet failed!";
const DELETE_FAILED: &str = "Deleting snippet failed!";
const FAVORITE_FAILED: &str = "Toggling favorite failed!";
const FAVORITES_FAILED: &str = "Fetching favorites failed!";

/// Snapshot of the snippet list as seen by views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetListState {
    pub snippets: Vec<Snippet>,
    pub pagination: Pagination,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct TagsPayload {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct TagStatsPayload {
    #[serde(default)]
    stats: Vec<TagStat>,
}

/// Keeps `is_loading` set while at least one tracked operation is in flight.
struct LoadingGuard<'a> {
    store: &'a SnippetStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.store.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.store.state.send_modify(|s| s.is_loading = false);
        }
    }
}

/// CRUD, tagging, favorites and public browse against `/snippets/*`.
pub struct SnippetStore {
    api: Arc<ApiClient>,
    state: watch::Sender<SnippetListState>,
    list_seq: AtomicU64,
    in_flight: AtomicUsize,
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SnippetStore")
            .field("snippets", &state.snippets.len())
            .field("pagination", &state.pagination)
            .field("is_loading", &state.is_loading)
            .finish_non_exhaustive()
    }
}

impl SnippetStore {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _rx) = watch::channel(SnippetListState::default());
        Self {
            api,
            state,
            list_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SnippetListState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SnippetListState> {
        self.state.subscribe()
    }

    /// Creates a snippet and prepends the server's copy to the list.
    pub async fn create_snippet(&self, draft: &SnippetDraft) -> Option<Snippet> {
        let snippet: Snippet = self
            .track("create_snippet", CREATE_FAILED, self.api.post_json("/snippets/create", draft))
            .await?;

        tracing::debug!(snippet_id = %snippet.id, "snippet created");
        let created = snippet.clone();
        self.state.send_modify(|s| s.snippets.insert(0, created));
        Some(snippet)
    }

    /// Fetches one page of the user's snippets and replaces the list.
    ///
    /// Returns `true` if this response was applied.
    pub async fn get_snippets(&self, query: &SnippetQuery) -> bool {
        self.fetch_list("/snippets", query.to_params(), FETCH_FAILED)
            .await
    }

    /// Fetches one snippet. The list is not touched.
    pub async fn get_snippet_by_id(&self, id: &str) -> Option<Snippet> {
        let path = format!("/snippets/{id}");
        self.track("get_snippet_by_id", FETCH_BY_ID_FAILED, self.api.get(&path, &[]))
            .await
    }

    /// Replaces the editable fields of a snippet and swaps the server's copy in
    /// at the same position.
    pub async fn update_snippet(&self, id: &str, draft: &SnippetDraft) -> Option<Snippet> {
        let path = format!("/snippets/{id}");
        let snippet: Snippet = self
            .track("update_snippet", UPDATE_FAILED, self.api.put_json(&path, draft))
            .await?;

        let updated = snippet.clone();
        self.state.send_modify(|s| {
            if let Some(slot) = s.snippets.iter_mut().find(|existing| existing.id == id) {
                *slot = updated;
            }
        });
        tracing::debug!(snippet_id = %id, "snippet updated");
        Some(snippet)
    }

    /// Deletes a snippet and removes it from the list once the server confirms.
    ///
    /// Returns `true` on confirmation. A 2xx without `success`, or an empty 204
    /// body, counts as confirmed; only `success: false` does not.
    pub async fn delete_snippet(&self, id: &str) -> bool {
        let path = format!("/snippets/{id}");
        let Some(envelope) = self
            .track("delete_snippet", DELETE_FAILED, self.api.delete(&path))
            .await
        else {
            return false;
        };

        if !envelope.is_confirmed() {
            let message = envelope.message.unwrap_or_else(|| DELETE_FAILED.to_string());
            tracing::debug!(snippet_id = %id, message = %message, "delete not confirmed");
            self.state.send_modify(|s| s.error = Some(message));
            return false;
        }

        self.state.send_modify(|s| {
            if let Some(index) = s.snippets.iter().position(|snippet| snippet.id == id) {
                s.snippets.remove(index);
            }
        });
        tracing::debug!(snippet_id = %id, "snippet deleted");
        true
    }

    /// Flips favorite status and patches only `is_favorited` and
    /// `favorite_count` on the matching entry.
    pub async fn toggle_favorite(&self, id: &str) -> Option<FavoriteStatus> {
        let path = format!("/snippets/{id}/favorite");
        let status: FavoriteStatus = self
            .track("toggle_favorite", FAVORITE_FAILED, self.api.post(&path))
            .await?;

        self.state.send_modify(|s| {
            if let Some(snippet) = s.snippets.iter_mut().find(|snippet| snippet.id == id) {
                snippet.is_favorited = status.is_favorited;
                snippet.favorite_count = status.favorite_count;
            }
        });
        tracing::debug!(snippet_id = %id, is_favorited = status.is_favorited, "favorite toggled");
        Some(status)
    }

    /// Fetches one page of favorites and replaces the list.
    ///
    /// Returns `true` if this response was applied.
    pub async fn get_favorite_snippets(&self, page: u32, limit: Option<u32>) -> bool {
        let params = vec![
            ("page", page.max(1).to_string()),
            ("limit", limit.unwrap_or(DEFAULT_BROWSE_LIMIT).to_string()),
        ];
        self.fetch_list("/snippets/favorites", params, FAVORITES_FAILED)
            .await
    }

    /// All tags the user has used. Empty on any failure.
    pub async fn get_all_tags(&self) -> Vec<String> {
        match self.api.get::<TagsPayload>("/snippets/tags", &[]).await {
            Ok(payload) => payload.tags,
            Err(e) => {
                tracing::debug!(error = %e, "tag listing failed, showing none");
                Vec::new()
            }
        }
    }

    /// Per-tag usage counts. Empty on any failure.
    pub async fn get_tag_stats(&self) -> Vec<TagStat> {
        match self.api.get::<TagStatsPayload>("/snippets/tags/stats", &[]).await {
            Ok(payload) => payload.stats,
            Err(e) => {
                tracing::debug!(error = %e, "tag stats failed, showing none");
                Vec::new()
            }
        }
    }

    /// One page of public snippets. Returned to the caller, not stored.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get_public_snippets(&self, query: &SnippetQuery) -> Result<SnippetPage> {
        self.api.get("/snippets/public", &query.to_params()).await
    }

    /// One public snippet.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get_public_snippet_by_id(&self, id: &str) -> Result<Snippet> {
        self.api.get(&format!("/snippets/public/{id}"), &[]).await
    }

    /// Creates an owned copy of a public snippet and returns it so the caller
    /// can open it for editing. The list is not touched.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn fork_public_snippet(&self, id: &str) -> Result<Snippet> {
        let fork: Snippet = self.api.post(&format!("/snippets/{id}/fork")).await?;
        tracing::debug!(source_id = %id, fork_id = %fork.id, "snippet forked");
        Ok(fork)
    }

    /// Dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get_snippet_stats(&self) -> Result<SnippetStats> {
        self.api.get("/snippets/stats", &[]).await
    }

    async fn fetch_list(&self, path: &str, params: Vec<(&'static str, String)>, fallback: &str) -> bool {
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = self.begin();

        let result: Result<SnippetPage> = self.api.get(path, &params).await;

        if self.list_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(path = %path, seq, "discarding stale list response");
            return false;
        }

        match result {
            Ok(page) => {
                tracing::debug!(path = %path, count = page.snippets.len(), "list replaced");
                self.state.send_modify(|s| {
                    s.snippets = page.snippets;
                    if let Some(pagination) = page.pagination {
                        s.pagination = pagination;
                    }
                });
                true
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "list fetch failed");
                let message = e.user_message(fallback);
                self.state.send_modify(|s| s.error = Some(message));
                false
            }
        }
    }

    /// Runs `request` with loading tracked; failures are captured into `error`.
    async fn track<T, F>(&self, operation: &'static str, fallback: &str, request: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _loading = self.begin();
        match request.await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(operation, error = %e, "snippet operation failed");
                let message = e.user_message(fallback);
                self.state.send_modify(|s| s.error = Some(message));
                None
            }
        }
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        LoadingGuard { store: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RecordingNavigator;
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    fn offline_store() -> SnippetStore {
        // Nothing listens on the discard port, so every request fails fast.
        let api = ApiClient::new(
            "http://127.0.0.1:9/api/v1",
            Duration::from_secs(2),
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingNavigator::default()),
        )
        .unwrap();
        SnippetStore::new(Arc::new(api))
    }

    #[tokio::test]
    async fn transport_failure_uses_operation_fallback() {
        let store = offline_store();

        assert!(store.get_snippet_by_id("s1").await.is_none());
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(FETCH_BY_ID_FAILED));
        assert!(!state.is_loading);

        assert!(!store.delete_snippet("s1").await);
        assert_eq!(store.snapshot().error.as_deref(), Some(DELETE_FAILED));
    }

    #[tokio::test]
    async fn tag_reads_degrade_to_empty() {
        let store = offline_store();
        assert!(store.get_all_tags().await.is_empty());
        assert!(store.get_tag_stats().await.is_empty());
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn public_reads_return_errors_to_caller() {
        let store = offline_store();
        assert!(store.get_public_snippets(&SnippetQuery::public()).await.is_err());
        assert!(store.get_snippet_stats().await.is_err());
        assert_eq!(store.snapshot(), SnippetListState::default());
    }
}
