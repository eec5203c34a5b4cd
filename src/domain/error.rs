//! Error types for the SnippetVault client.
//!
//! This module defines the centralized error type [`SnippetVaultError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.

use thiserror::Error;

/// The main error type for SnippetVault client operations.
///
/// Transport, API, storage and validation failures all funnel into this enum.
/// Stores never return it from their state-mutating operations; they capture it
/// into their `error` field via [`SnippetVaultError::user_message`].
///
/// # Examples
///
/// ```
/// use snippetvault::SnippetVaultError;
///
/// let err = SnippetVaultError::Api { status: 409, message: Some("Username taken".into()) };
/// assert_eq!(err.user_message("Registration failed"), "Username taken");
///
/// let err = SnippetVaultError::Storage("disk full".into());
/// assert_eq!(err.user_message("Registration failed"), "Registration failed");
/// ```
#[derive(Debug, Error)]
pub enum SnippetVaultError {
    /// Durable local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced an HTTP response (DNS, connect, timeout, body decode).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// `message` carries the server-provided `message` field when the error body
    /// had one.
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, verbatim.
        message: Option<String>,
    },

    /// The server answered 401 for a request that requires a session.
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("session expired"))]
    Unauthorized {
        /// Server-provided message, verbatim.
        message: Option<String>,
    },

    /// The response body did not match the expected envelope or payload shape.
    #[error("Malformed response: {0}")]
    Envelope(String),

    /// Client-side validation rejected the input before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnippetVaultError {
    /// Returns the message to surface in store state.
    ///
    /// Server messages are passed through verbatim, validation messages are
    /// already user-facing, everything else collapses to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            }
            | Self::Unauthorized {
                message: Some(message),
            } => message.clone(),
            Self::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Returns `true` for errors produced by a 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<serde_json::Error> for SnippetVaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Envelope(err.to_string())
    }
}

/// A specialized `Result` type for SnippetVault operations.
pub type Result<T> = std::result::Result<T, SnippetVaultError>;
