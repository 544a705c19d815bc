use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-store address of an externalized block payload.
///
/// The ledger treats this as an opaque string: whatever key the backing store
/// returned from `put` is what it hands back to `get`. Backends shipped in
/// `btcm-store` use a hex SHA-256 digest, but nothing here relies on that.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Wrap a backend-issued key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as raw bytes (used for hashing).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// First 12 characters, for logs.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Returns `true` if the key is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.short())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ContentKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
