//! User profile model and authentication payloads.
//!
//! The profile is opaque to the client beyond display. Auth responses come in
//! two historical shapes, both handled by [`AuthPayload`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user's profile as returned by `/auth/*` endpoints.
///
/// Serialized in the server's camelCase shape so the same bytes can be cached
/// under `sv_user` and read back at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    /// Avatar image URL. Older responses call this `avatarUrl`.
    #[serde(default, rename = "avatar", alias = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Success payload of `/auth/register` and `/auth/login`.
///
/// Current servers send `{ user, accessToken, refreshToken }`. Older builds
/// returned the bare user object from register.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthPayload {
    WithCredentials {
        user: UserProfile,
        #[serde(default, rename = "accessToken")]
        access_token: Option<String>,
        #[serde(default, rename = "refreshToken")]
        refresh_token: Option<String>,
    },
    Bare(UserProfile),
}

impl AuthPayload {
    /// Splits the payload into the user and the bearer token, if one was issued.
    #[must_use]
    pub fn into_parts(self) -> (UserProfile, Option<String>) {
        match self {
            Self::WithCredentials {
                user, access_token, ..
            } => (user, access_token),
            Self::Bare(user) => (user, None),
        }
    }
}

/// Image file attached to a registration or avatar update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Builds an upload, guessing the MIME type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
        .to_string();

        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

/// Registration form data.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: Option<AvatarUpload>,
}

impl RegisterForm {
    /// Returns the wire name of the first blank required field, if any.
    ///
    /// Required-field presence is the only validation the client performs.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("email", &self.email),
            ("fullName", &self.full_name),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}
