use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use btcm_crypto::ContentHasher;
use btcm_types::ContentKey;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` and
/// cloned on read. [`InMemoryContentStore::set_available`] lets tests take the
/// store "offline" so every call fails with `Unavailable`.
pub struct InMemoryContentStore {
    objects: RwLock<HashMap<ContentKey, Vec<u8>>>,
    available: AtomicBool,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<ContentKey> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<ContentKey> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Simulate the backend going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<ContentKey> {
        self.check_available()?;
        let key = ContentKey::new(ContentHasher::OBJECT.hash_hex(bytes));
        let mut map = self
            .objects
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        // Same key always maps to the same content; keep the first copy.
        map.entry(key.clone()).or_insert_with(|| bytes.to_vec());
        debug!(key = %key.short(), len = bytes.len(), "stored object");
        Ok(key)
    }

    fn get(&self, key: &ContentKey) -> StoreResult<Vec<u8>> {
        self.check_available()?;
        let map = self
            .objects
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    fn contains(&self, key: &ContentKey) -> StoreResult<bool> {
        self.check_available()?;
        let map = self
            .objects
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("object_count", &self.len())
            .field("available", &self.available.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Put / get symmetry
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get_roundtrip() {
        let store = InMemoryContentStore::new();
        let key = store.put(b"hello world").unwrap();
        assert!(!key.is_empty());
        assert_eq!(store.get(&key).unwrap(), b"hello world");
    }

    #[test]
    fn get_unknown_key_is_not_found() {
        let store = InMemoryContentStore::new();
        let err = store.get(&ContentKey::new("missing")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(k) if k.as_str() == "missing"));
    }

    #[test]
    fn empty_bytes_are_storable() {
        let store = InMemoryContentStore::new();
        let key = store.put(b"").unwrap();
        assert!(store.get(&key).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Content addressing
    // -----------------------------------------------------------------------

    #[test]
    fn same_content_produces_same_key() {
        let store = InMemoryContentStore::new();
        let k1 = store.put(b"identical content").unwrap();
        let k2 = store.put(b"identical content").unwrap();
        assert_eq!(k1, k2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_produces_different_keys() {
        let store = InMemoryContentStore::new();
        let k1 = store.put(b"aaa").unwrap();
        let k2 = store.put(b"bbb").unwrap();
        assert_ne!(k1, k2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn key_is_content_hash() {
        let store = InMemoryContentStore::new();
        let key = store.put(b"verify me").unwrap();
        assert!(ContentHasher::OBJECT.verify(b"verify me", key.as_str()));
    }

    // -----------------------------------------------------------------------
    // Availability
    // -----------------------------------------------------------------------

    #[test]
    fn offline_store_fails_every_call() {
        let store = InMemoryContentStore::new();
        let key = store.put(b"before outage").unwrap();

        store.set_available(false);
        assert!(store.put(b"during outage").unwrap_err().is_unavailable());
        assert!(store.get(&key).unwrap_err().is_unavailable());
        assert!(store.contains(&key).unwrap_err().is_unavailable());

        store.set_available(true);
        assert_eq!(store.get(&key).unwrap(), b"before outage");
    }

    #[test]
    fn not_found_is_not_unavailable() {
        let store = InMemoryContentStore::new();
        assert!(!store.get(&ContentKey::new("x")).unwrap_err().is_unavailable());
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn contains_reflects_writes() {
        let store = InMemoryContentStore::new();
        let key = store.put(b"present").unwrap();
        assert!(store.contains(&key).unwrap());
        assert!(!store.contains(&ContentKey::new("absent")).unwrap());
    }

    #[test]
    fn len_total_bytes_and_keys() {
        let store = InMemoryContentStore::new();
        assert!(store.is_empty());
        store.put(b"12345").unwrap();
        store.put(b"123456789").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_bytes(), 14);

        let keys = store.keys();
        assert_eq!(keys.len(), 2);
        assert!(keys[0] <= keys[1]);
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryContentStore::new());
        let key = store.put(b"shared data").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let key = key.clone();
                thread::spawn(move || {
                    assert_eq!(store.get(&key).unwrap(), b"shared data");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryContentStore::new();
        store.put(b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("object_count"));
    }
}
