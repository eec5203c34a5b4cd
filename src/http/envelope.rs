//! Response envelope normalization.
//!
//! The API wraps every payload as `{ success, message, data }`. Some server
//! revisions wrapped it twice (`{ data: { data: ... } }`). [`ApiEnvelope`] is the
//! single place that tolerates both, so call sites only ever see the payload.

use crate::domain::error::{Result, SnippetVaultError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Keys that may sit next to `data` in an envelope.
const ENVELOPE_KEYS: &[&str] = &["data", "success", "message", "statusCode"];

/// Parsed response body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Parses a response body. An empty body yields an empty envelope.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Envelope`] if the body is not a JSON object.
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| SnippetVaultError::Envelope(format!("invalid envelope: {e}")))
    }

    /// Returns `false` only when the server explicitly reported `success: false`.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.success != Some(false)
    }

    /// Returns the payload with one level of legacy double wrapping removed.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        let data = self.data.as_ref()?;
        match data {
            Value::Object(map)
                if map.contains_key("data") && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) =>
            {
                map.get("data")
            }
            _ => Some(data),
        }
    }

    /// Deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Envelope`] if there is no payload or it does
    /// not match `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        let payload = self
            .payload()
            .cloned()
            .ok_or_else(|| SnippetVaultError::Envelope("response has no data".to_string()))?;
        serde_json::from_value(payload)
            .map_err(|e| SnippetVaultError::Envelope(format!("unexpected payload: {e}")))
    }
}

/// Extracts the `message` field from an error response body, if there is one.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
