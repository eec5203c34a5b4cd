//! HTTP layer: the configured transport, envelope normalization and the
//! navigation seam used for the unauthorized redirect.
//!
//! # Modules
//!
//! - [`client`]: [`ApiClient`], bearer attachment and status mapping
//! - [`envelope`]: tolerant `{ data }` / `{ data: { data } }` adapter
//! - [`navigator`]: [`Navigator`] trait and a recording implementation

pub mod client;
pub mod envelope;
pub mod navigator;

pub use client::{avatar_part, redirects_on_unauthorized, ApiClient};
pub use envelope::ApiEnvelope;
pub use navigator::{Navigator, RecordingNavigator, LOGIN_PATH};
