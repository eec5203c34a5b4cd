//! Snippet domain model, drafts, list queries and read-only aggregates.

use super::tags::TagSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reference to the snippet's owner.
///
/// List endpoints return the bare id; detail and public endpoints populate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(String),
    Profile {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default, rename = "fullName")]
        full_name: Option<String>,
    },
}

impl OwnerRef {
    /// Returns the owner's id regardless of representation.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Profile { id, .. } => id,
        }
    }
}

/// A user-owned record of source code plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub code_language: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
}

/// Editable fields submitted on create and update.
///
/// Updates are full replacements of these fields. Tags go through [`TagSet`]
/// so the payload is always normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetDraft {
    pub title: String,
    pub code: String,
    pub code_language: String,
    pub description: String,
    pub tags: TagSet,
    pub is_public: bool,
}

impl Default for SnippetDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            code: String::new(),
            code_language: "javascript".to_string(),
            description: String::new(),
            tags: TagSet::default(),
            is_public: false,
        }
    }
}

impl From<&Snippet> for SnippetDraft {
    /// Seeds an edit form from an existing snippet, normalizing its tags.
    fn from(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            code: snippet.code.clone(),
            code_language: snippet.code_language.clone(),
            description: snippet.description.clone(),
            tags: TagSet::from_lossy(&snippet.tags),
            is_public: snippet.is_public,
        }
    }
}

/// Server-provided pagination metadata, mirrored after each list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: 6,
            total_pages: 1,
        }
    }
}

/// One page of snippets as returned by list endpoints.
///
/// `snippets` is required: a payload without it is rejected rather than read
/// as an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnippetPage {
    pub snippets: Vec<Snippet>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Filters for list endpoints.
///
/// Empty filters are omitted from the query string. `tags` are sent as a single
/// comma-joined parameter; `from`/`to` bound `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub tags: Vec<String>,
    pub language: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Default page size of the owner's snippet list.
pub const DEFAULT_LIST_LIMIT: u32 = 6;

/// Default page size of favorites and public listings.
pub const DEFAULT_BROWSE_LIMIT: u32 = 10;

impl Default for SnippetQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIST_LIMIT,
            search: String::new(),
            tags: Vec::new(),
            language: String::new(),
            from: None,
            to: None,
        }
    }
}

impl SnippetQuery {
    /// Query for the public browse listing, which pages by 10.
    #[must_use]
    pub fn public() -> Self {
        Self {
            limit: DEFAULT_BROWSE_LIMIT,
            ..Self::default()
        }
    }

    /// Renders the query into `(name, value)` pairs, skipping empty filters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }

        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            params.push(("tags", tags.join(",")));
        }

        let language = self.language.trim();
        if !language.is_empty() {
            params.push(("language", language.to_string()));
        }
        if let Some(from) = self.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }

        params
    }
}

/// Result of `POST /snippets/:id/favorite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
    pub is_favorited: bool,
    pub favorite_count: u64,
}

/// Usage count for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    #[serde(alias = "_id")]
    pub tag: String,
    pub count: u64,
}

/// Usage count for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    #[serde(alias = "_id")]
    pub language: String,
    pub count: u64,
}

/// Character totals across the user's snippets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUsage {
    #[serde(default)]
    pub total: u64,
}

/// Dashboard aggregates from `GET /snippets/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetStats {
    #[serde(default)]
    pub total_snippets: u64,
    #[serde(default)]
    pub storage_usage: StorageUsage,
    #[serde(default)]
    pub most_used_languages: Vec<LanguageCount>,
}
