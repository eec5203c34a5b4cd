//! Configured request transport for the SnippetVault API.
//!
//! Every request goes through [`ApiClient::execute`], which:
//! 1. Attaches `Authorization: Bearer <token>` when a token is persisted
//! 2. Normalizes successful bodies through [`ApiEnvelope`]
//! 3. Maps error statuses to [`SnippetVaultError::Api`] or
//!    [`SnippetVaultError::Unauthorized`] with the server message
//! 4. On 401 outside `/auth/login` and `/auth/register`, runs the unauthorized
//!    hook and redirects to the login view unless it is already shown
//!
//! No request is retried and no error is swallowed.

use super::envelope::{error_message, ApiEnvelope};
use super::navigator::{Navigator, LOGIN_PATH};
use crate::domain::error::{Result, SnippetVaultError};
use crate::domain::AvatarUpload;
use crate::storage::{keys, LocalStorage};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const USER_AGENT: &str = concat!("snippetvault/", env!("CARGO_PKG_VERSION"));

/// Endpoints whose 401 is a credential error, not an expired session.
const AUTH_ATTEMPT_PATHS: &[&str] = &["/auth/login", "/auth/register"];

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Shared HTTP transport. Cheap to share behind an `Arc`.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn LocalStorage>,
    navigator: Arc<dyn Navigator>,
    on_unauthorized: OnceLock<UnauthorizedHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Returns `true` if a 401 on `path` should force the login view.
#[must_use]
pub fn redirects_on_unauthorized(path: &str) -> bool {
    !AUTH_ATTEMPT_PATHS.iter().any(|auth| path.contains(auth))
}

impl ApiClient {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        storage: Arc<dyn LocalStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
            navigator,
            on_unauthorized: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers the callback run before the login redirect.
    ///
    /// Only the first registration takes effect.
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        if self.on_unauthorized.set(Box::new(hook)).is_err() {
            tracing::warn!("unauthorized hook already registered");
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.request(Method::GET, path).query(query);
        self.execute(path, request).await?.into_data()
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        self.execute(path, request).await?.into_data()
    }

    /// POST without a body, for action endpoints such as favorite and fork.
    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::POST, path);
        self.execute(path, request).await?.into_data()
    }

    /// POST without a body whose payload the caller does not need.
    pub async fn post_unit(&self, path: &str) -> Result<ApiEnvelope> {
        let request = self.request(Method::POST, path);
        self.execute(path, request).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let request = self.request(Method::POST, path).multipart(form);
        self.execute(path, request).await?.into_data()
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path).json(body);
        self.execute(path, request).await?.into_data()
    }

    pub async fn patch_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PATCH, path).json(body);
        self.execute(path, request).await?.into_data()
    }

    /// PATCH with a JSON body, returning the raw envelope.
    pub async fn patch_json_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiEnvelope> {
        let request = self.request(Method::PATCH, path).json(body);
        self.execute(path, request).await
    }

    pub async fn patch_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let request = self.request(Method::PATCH, path).multipart(form);
        self.execute(path, request).await?.into_data()
    }

    /// DELETE, returning the envelope so callers can check `success`.
    pub async fn delete(&self, path: &str) -> Result<ApiEnvelope> {
        let request = self.request(Method::DELETE, path);
        self.execute(path, request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);

        match self.storage.get_item(keys::ACCESS_TOKEN) {
            Ok(Some(token)) if !token.is_empty() => builder.bearer_auth(token),
            Ok(_) => builder,
            Err(e) => {
                tracing::debug!(error = %e, "could not read access token, sending anonymously");
                builder
            }
        }
    }

    #[tracing::instrument(name = "api_request", level = "debug", skip(self, request))]
    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<ApiEnvelope> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "api response");

        if status.is_success() {
            return ApiEnvelope::parse(&body);
        }

        let message = error_message(&body);
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path);
            return Err(SnippetVaultError::Unauthorized { message });
        }

        Err(SnippetVaultError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn handle_unauthorized(&self, path: &str) {
        if !redirects_on_unauthorized(path) {
            tracing::debug!(path = %path, "credential rejected on auth attempt");
            return;
        }

        tracing::info!(path = %path, "session rejected by server");
        if let Some(hook) = self.on_unauthorized.get() {
            hook();
        }

        if self.navigator.current_path() != LOGIN_PATH {
            self.navigator.navigate_to(LOGIN_PATH);
        }
    }
}

/// Builds the multipart part for an avatar image.
///
/// # Errors
///
/// Returns [`SnippetVaultError::Validation`] if the MIME type is unparseable.
pub fn avatar_part(upload: &AvatarUpload) -> Result<Part> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime_type)
        .map_err(|e| SnippetVaultError::Validation(format!("invalid avatar type: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_attempts_do_not_redirect() {
        assert!(!redirects_on_unauthorized("/auth/login"));
        assert!(!redirects_on_unauthorized("/auth/register"));
        assert!(redirects_on_unauthorized("/auth/profile"));
        assert!(redirects_on_unauthorized("/snippets/abc"));
    }
}
