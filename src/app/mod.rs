//! Application layer: the stores views read from and call into.
//!
//! Stores hold their state in `tokio::sync::watch` channels. Views take a
//! snapshot or subscribe; operations update state from the server's answer.
//!
//! # Modules
//!
//! - [`session`]: sign-in state, register/login/logout, rehydration
//! - [`snippets`]: snippet list, CRUD, favorites, tags, public browse
//! - [`profile`]: profile, password and avatar updates
//! - [`search`]: search-as-you-type debounce
//! - [`context`]: wiring of all of the above
//!
//! # Example
//!
//! ```no_run
//! use snippetvault::app::AppContext;
//! use snippetvault::http::RecordingNavigator;
//! use snippetvault::storage::MemoryStorage;
//! use snippetvault::Config;
//! use std::sync::Arc;
//!
//! # async fn run() -> snippetvault::Result<()> {
//! let ctx = AppContext::new(
//!     &Config::default(),
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(RecordingNavigator::default()),
//! )?;
//! ctx.session.login("ada", "hunter2").await;
//! if ctx.session.snapshot().is_verified {
//!     ctx.snippets.get_snippets(&Default::default()).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod profile;
pub mod search;
pub mod session;
pub mod snippets;

pub use context::AppContext;
pub use profile::ProfileService;
pub use search::{Debouncer, DEFAULT_DEBOUNCE};
pub use session::{SessionState, SessionStore};
pub use snippets::{SnippetListState, SnippetStore};
