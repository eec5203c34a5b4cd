//! Domain layer for the SnippetVault client.
//!
//! This module contains the core data types exchanged with the API, independent
//! of transport or storage concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`user`]: User profile, auth payloads and registration form
//! - [`snippet`]: Snippet model, drafts, list queries and aggregates
//! - [`tags`]: Tag normalization and the 10-tag limit
//!
//! # Examples
//!
//! ```
//! use snippetvault::domain::{SnippetDraft, TagSet, Result};
//!
//! fn draft() -> Result<SnippetDraft> {
//!     Ok(SnippetDraft {
//!         title: "debounce".to_string(),
//!         code: "fn main() {}".to_string(),
//!         code_language: "rust".to_string(),
//!         tags: TagSet::try_from_raw(["Rust", "async"])?,
//!         ..SnippetDraft::default()
//!     })
//! }
//! # draft().unwrap();
//! ```

pub mod error;
pub mod snippet;
pub mod tags;
pub mod user;

pub use error::{Result, SnippetVaultError};
pub use snippet::{
    FavoriteStatus, LanguageCount, OwnerRef, Pagination, Snippet, SnippetDraft, SnippetPage,
    SnippetQuery, SnippetStats, StorageUsage, TagStat, DEFAULT_BROWSE_LIMIT, DEFAULT_LIST_LIMIT,
};
pub use tags::{normalize_tag, TagSet, MAX_TAGS};
pub use user::{AuthPayload, AvatarUpload, RegisterForm, UserProfile};
