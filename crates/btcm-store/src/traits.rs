use btcm_types::ContentKey;

use crate::error::{StoreError, StoreResult};

/// Content-addressed byte store holding block payloads.
///
/// All implementations must satisfy these invariants:
/// - `get(put(bytes))` returns exactly `bytes`.
/// - Stored objects are immutable; writing the same bytes again is a no-op
///   that returns the same key.
/// - Concurrent reads are always safe.
/// - The store never interprets object contents.
/// - Backend failures are propagated, never retried or swallowed.
pub trait ContentStore: Send + Sync {
    /// Store bytes and return the key they can be retrieved under.
    fn put(&self, bytes: &[u8]) -> StoreResult<ContentKey>;

    /// Fetch the bytes stored under `key`.
    ///
    /// Returns `Err(StoreError::NotFound)` if the key is unknown.
    fn get(&self, key: &ContentKey) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists under `key`.
    ///
    /// Default implementation performs a full `get`. Backends may override
    /// with a cheaper existence check.
    fn contains(&self, key: &ContentKey) -> StoreResult<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
