//! Profile service: read and edit the signed-in user's account.
//!
//! Unlike the stores, these calls return `Result` so a settings view can show
//! the message next to the form that caused it. Successful profile and avatar
//! updates are pushed into the [`SessionStore`] so the cached user stays fresh.

use super::session::SessionStore;
use crate::domain::error::{Result, SnippetVaultError};
use crate::domain::{AvatarUpload, UserProfile};
use crate::http::{avatar_part, ApiClient};
use reqwest::multipart::Form;
use serde::Serialize;
use std::sync::Arc;

const PROFILE_FAILED: &str = "Failed to load profile";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordUpdate<'a> {
    old_password: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

/// Non-blank, trimmed value of an optional form field.
fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug)]
pub struct ProfileService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Fetches the current profile from the server.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Api`] carrying the server message, or
    /// `Failed to load profile` when there is none.
    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.api
            .get("/auth/profile", &[])
            .await
            .map_err(|e| match e {
                SnippetVaultError::Api { status, message } => SnippetVaultError::Api {
                    status,
                    message: message.or_else(|| Some(PROFILE_FAILED.to_string())),
                },
                other => other,
            })
    }

    /// Updates display name and/or email. Blank fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Validation`] when both fields are blank,
    /// otherwise the transport or API error.
    pub async fn update_profile(
        &self,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserProfile> {
        let update = ProfileUpdate {
            full_name: filled(full_name),
            email: filled(email),
        };
        if update.full_name.is_none() && update.email.is_none() {
            return Err(SnippetVaultError::Validation(
                "Please provide at least one field to update".to_string(),
            ));
        }

        let user: UserProfile = self.api.patch_json("/auth/update-profile", &update).await?;
        tracing::debug!(user_id = %user.id, "profile updated");
        self.session.refresh_user(user.clone());
        Ok(user)
    }

    /// Changes the password.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Validation`] when a field is blank or the
    /// confirmation differs, otherwise the transport or API error.
    pub async fn update_password(&self, old: &str, new: &str, confirm: &str) -> Result<()> {
        if [old, new, confirm].iter().any(|v| v.is_empty()) {
            return Err(SnippetVaultError::Validation("All fields are required".to_string()));
        }
        if new != confirm {
            return Err(SnippetVaultError::Validation(
                "New password and confirm password must match".to_string(),
            ));
        }

        let body = PasswordUpdate {
            old_password: old,
            new_password: new,
            confirm_password: confirm,
        };
        self.api.patch_json_unit("/auth/update-password", &body).await?;
        tracing::debug!("password updated");
        Ok(())
    }

    /// Replaces the avatar image.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Validation`] for an empty file or bad MIME
    /// type, otherwise the transport or API error.
    pub async fn update_avatar(&self, upload: &AvatarUpload) -> Result<UserProfile> {
        if upload.bytes.is_empty() {
            return Err(SnippetVaultError::Validation("Avatar file is missing".to_string()));
        }

        let form = Form::new().part("avatar", avatar_part(upload)?);
        let user: UserProfile = self.api.patch_multipart("/auth/update-avatar", form).await?;
        tracing::debug!(user_id = %user.id, bytes = upload.bytes.len(), "avatar updated");
        self.session.refresh_user(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RecordingNavigator;
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    fn offline_service() -> ProfileService {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(
            ApiClient::new(
                "http://127.0.0.1:9/api/v1",
                Duration::from_secs(2),
                storage.clone(),
                Arc::new(RecordingNavigator::default()),
            )
            .unwrap(),
        );
        let session = Arc::new(SessionStore::new(api.clone(), storage));
        ProfileService::new(api, session)
    }

    #[tokio::test]
    async fn blank_profile_update_is_rejected_locally() {
        let service = offline_service();
        let err = service.update_profile(Some("  "), None).await.unwrap_err();
        assert_eq!(
            err.user_message("x"),
            "Please provide at least one field to update"
        );
    }

    #[tokio::test]
    async fn mismatched_password_confirmation_is_rejected() {
        let service = offline_service();
        let err = service.update_password("old", "new1", "new2").await.unwrap_err();
        assert!(matches!(err, SnippetVaultError::Validation(_)));

        let err = service.update_password("", "new", "new").await.unwrap_err();
        assert_eq!(err.user_message("x"), "All fields are required");
    }

    #[test]
    fn filled_trims_and_drops_blanks() {
        assert_eq!(filled(Some("  Ada ")), Some("Ada"));
        assert_eq!(filled(Some("   ")), None);
        assert_eq!(filled(None), None);
    }
}
