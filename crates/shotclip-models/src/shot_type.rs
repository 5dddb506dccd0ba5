//! Shot type labels.
//!
//! A shot type is both a metadata tag embedded in the clip and the name of the
//! directory the clip is stored under, so it must be a single safe path segment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Maximum accepted label length in characters.
pub const MAX_SHOT_TYPE_LEN: usize = 64;

/// A validated shot type label (e.g. `wide`, `close-up`, `over_shoulder`).
///
/// Only ASCII letters, digits, `-` and `_` are accepted, which rules out path
/// separators, traversal sequences, NUL bytes and whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ShotType(String);

impl ShotType {
    /// Validate a raw label. Surrounding whitespace is trimmed first.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        let label = raw.trim();

        if label.is_empty() {
            return Err(ModelError::invalid_shot_type("shot type must not be empty"));
        }

        if label.chars().count() > MAX_SHOT_TYPE_LEN {
            return Err(ModelError::invalid_shot_type(format!(
                "shot type must be at most {} characters",
                MAX_SHOT_TYPE_LEN
            )));
        }

        if let Some(bad) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ModelError::invalid_shot_type(format!(
                "shot type contains disallowed character {:?}",
                bad
            )));
        }

        Ok(Self(label.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ShotType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShotType {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        Self::parse(&s)
    }
}

impl<'de> Deserialize<'de> for ShotType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
