use serde::{Deserialize, Deserializer, Serialize};

/// Errors produced while validating a digest string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The hex portion is not exactly 64 characters long.
    #[error("Invalid SHA256 digest: expected 64 hex characters, got {len} in '{value}'")]
    Length {
        /// Length of the hex portion that was supplied.
        len: usize,
        /// The offending input.
        value: String,
    },

    /// The hex portion contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// A validated SHA256 digest (64 hex characters)
///
/// Every patch and icon in a formula carries one of these. Validation
/// happens at deserialization time so a typo in a formula file fails the
/// load instead of surfacing later as a checksum mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix. The stored value
    /// is always lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError`] if the hex portion is not exactly 64 ASCII
    /// hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(DigestError::Length {
                len: hex.len(),
                value: s.clone(),
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s.clone()));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
