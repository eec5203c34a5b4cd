//! Tag normalization.
//!
//! Tags are trimmed, lower-cased and deduplicated client-side before any
//! snippet is submitted. A snippet carries at most [`MAX_TAGS`] tags.

use super::error::{Result, SnippetVaultError};
use serde::{Deserialize, Serialize};

/// Maximum number of tags per snippet.
pub const MAX_TAGS: usize = 10;

/// Normalizes a single raw tag. Returns `None` for blank input.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

/// Ordered set of normalized tags, capped at [`MAX_TAGS`].
///
/// Insertion order is preserved so the form shows tags in the order typed.
///
/// # Examples
///
/// ```
/// use snippetvault::domain::TagSet;
///
/// let tags = TagSet::try_from_raw(["  React ", "REACT", "node"])?;
/// assert_eq!(tags.as_slice(), ["react", "node"]);
/// # Ok::<(), snippetvault::SnippetVaultError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Builds a set from raw input, rejecting more than [`MAX_TAGS`] distinct tags.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Validation`] if the normalized set would
    /// exceed the limit.
    pub fn try_from_raw<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for tag in raw {
            set.add(tag.as_ref())?;
        }
        Ok(set)
    }

    /// Builds a set from server data, keeping the first [`MAX_TAGS`] distinct tags.
    #[must_use]
    pub fn from_lossy(raw: &[String]) -> Self {
        let mut set = Self::default();
        for tag in raw {
            if set.add(tag).is_err() {
                break;
            }
        }
        set
    }

    /// Adds a raw tag.
    ///
    /// Returns `Ok(true)` if the tag was inserted, `Ok(false)` if it was blank
    /// or already present.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetVaultError::Validation`] when adding a new tag to a full set.
    pub fn add(&mut self, raw: &str) -> Result<bool> {
        let Some(tag) = normalize_tag(raw) else {
            return Ok(false);
        };
        if self.0.contains(&tag) {
            return Ok(false);
        }
        if self.is_full() {
            return Err(SnippetVaultError::Validation(format!(
                "A snippet can have at most {MAX_TAGS} tags"
            )));
        }
        self.0.push(tag);
        Ok(true)
    }

    /// Removes a tag, normalizing the input first. Returns whether it was present.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Some(tag) = normalize_tag(raw) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|t| *t != tag);
        self.0.len() != before
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_TAGS
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl TryFrom<Vec<String>> for TagSet {
    type Error = SnippetVaultError;

    fn try_from(raw: Vec<String>) -> Result<Self> {
        Self::try_from_raw(raw)
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
