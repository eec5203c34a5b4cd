//! Session store: who is signed in.
//!
//! [`SessionStore`] owns the [`SessionState`] snapshot, persists identity to
//! durable storage and rehydrates it at construction. Failures never escape as
//! `Err`; they land in [`SessionState::error`] for the view to render.
//!
//! # State Transitions
//!
//! ```text
//! rehydrate ──► anonymous ──register/login ok──► verified
//!                  ▲   ▲                            │
//!                  │   └───── logout (always) ──────┤
//!                  └──────── 401 on any request ────┘
//! ```

use crate::domain::error::{Result, SnippetVaultError};
use crate::domain::{AuthPayload, RegisterForm, UserProfile};
use crate::http::{avatar_part, ApiClient};
use crate::storage::{keys, LocalStorage};
use reqwest::multipart::Form;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

const REGISTER_FAILED: &str = "Registration failed";
const LOGIN_FAILED: &str = "Login failed";

/// Snapshot of the session as seen by views.
///
/// `is_verified` is never `true` while `user` is `None` unless a persisted
/// bearer token vouches for the session (rehydration without a cached profile).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_verified: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// Rebuilds the session from durable storage.
    ///
    /// A corrupt `sv_user` record is removed and ignored. A persisted token
    /// alone is enough to mark the session verified.
    pub fn rehydrate(storage: &dyn LocalStorage) -> Self {
        let _span = tracing::debug_span!("session_rehydrate").entered();

        let user = match storage.get_item(keys::USER) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::debug!(error = %e, "discarding corrupt cached user");
                    if let Err(e) = storage.remove_item(keys::USER) {
                        tracing::debug!(error = %e, "failed to remove corrupt cached user");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read cached user");
                None
            }
        };

        let has_token = storage
            .get_item(keys::ACCESS_TOKEN)
            .ok()
            .flatten()
            .is_some_and(|token| !token.is_empty());

        tracing::debug!(has_user = user.is_some(), has_token, "session rehydrated");

        Self {
            is_verified: user.is_some() || has_token,
            user,
            is_loading: false,
            error: None,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// Auth operations and the session snapshot.
pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: Arc<dyn LocalStorage>,
    state: Arc<watch::Sender<SessionState>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Drops the signed-in identity from memory and storage.
fn clear_identity(state: &watch::Sender<SessionState>, storage: &dyn LocalStorage) {
    for key in [keys::USER, keys::ACCESS_TOKEN] {
        if let Err(e) = storage.remove_item(key) {
            tracing::warn!(key, error = %e, "failed to clear persisted identity");
        }
    }
    state.send_modify(|s| {
        s.user = None;
        s.is_verified = false;
    });
}

impl SessionStore {
    /// Rehydrates the session and subscribes to unauthorized responses.
    ///
    /// Any 401 outside the auth endpoints clears the session, so the view sees
    /// an anonymous state by the time the login redirect happens.
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn LocalStorage>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::rehydrate(storage.as_ref()));
        let state = Arc::new(tx);

        {
            let state = Arc::clone(&state);
            let storage = Arc::clone(&storage);
            api.set_unauthorized_hook(move || clear_identity(&state, storage.as_ref()));
        }

        Self {
            api,
            storage,
            state,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Registers a new account, uploading the avatar if one is attached.
    pub async fn register(&self, form: RegisterForm) {
        tracing::debug!(username = %form.username, has_avatar = form.avatar.is_some(), "registration requested");
        self.begin();

        let result = match form.missing_field() {
            Some(field) => Err(SnippetVaultError::Validation(format!("{field} is required"))),
            None => match Self::register_form(&form) {
                Ok(multipart) => {
                    self.api
                        .post_multipart::<AuthPayload>("/auth/register", multipart)
                        .await
                }
                Err(e) => Err(e),
            },
        };

        self.finish_auth(result, REGISTER_FAILED);
    }

    /// Signs in with a username or email plus password.
    pub async fn login(&self, identifier: &str, password: &str) {
        tracing::debug!(identifier = %identifier, "login requested");
        self.begin();

        let result = self
            .api
            .post_json::<AuthPayload, _>("/auth/login", &LoginRequest { identifier, password })
            .await;

        self.finish_auth(result, LOGIN_FAILED);
    }

    /// Signs out.
    ///
    /// The server call is best-effort; local identity is cleared whatever it
    /// answers.
    pub async fn logout(&self) {
        self.begin();

        if let Err(e) = self.api.post_unit("/auth/logout").await {
            tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
        }

        clear_identity(&self.state, self.storage.as_ref());
        self.state.send_modify(|s| s.is_loading = false);
        tracing::info!("signed out");
    }

    /// Replaces the cached profile after a profile or avatar update.
    ///
    /// No-op while signed out.
    pub fn refresh_user(&self, user: UserProfile) {
        if !self.state.borrow().is_verified {
            return;
        }
        self.persist_user(&user);
        self.state.send_modify(|s| s.user = Some(user));
    }

    fn register_form(form: &RegisterForm) -> Result<Form> {
        let mut multipart = Form::new()
            .text("username", form.username.clone())
            .text("email", form.email.clone())
            .text("password", form.password.clone())
            .text("fullName", form.full_name.clone());
        if let Some(avatar) = &form.avatar {
            multipart = multipart.part("avatar", avatar_part(avatar)?);
        }
        Ok(multipart)
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn finish_auth(&self, result: Result<AuthPayload>, fallback: &str) {
        match result {
            Ok(payload) => {
                let (user, token) = payload.into_parts();
                tracing::info!(user_id = %user.id, username = %user.username, "signed in");

                if let Some(token) = token.filter(|t| !t.is_empty()) {
                    if let Err(e) = self.storage.set_item(keys::ACCESS_TOKEN, &token) {
                        tracing::warn!(error = %e, "failed to persist access token");
                    }
                }
                self.persist_user(&user);

                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.is_verified = true;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "authentication failed");
                let message = e.user_message(fallback);
                self.state.send_modify(|s| {
                    s.is_verified = false;
                    s.is_loading = false;
                    s.error = Some(message);
                });
            }
        }
    }

    fn persist_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(keys::USER, &json) {
                    tracing::warn!(error = %e, "failed to persist user");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize user"),
        }
    }
}
