use sha2::{Digest, Sha256};

/// Plain SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Domain-separated SHA-256 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so the same bytes hashed under two domains never produce the
/// same digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for objects written to a content store.
    pub const OBJECT: Self = Self {
        domain: "btcm-object-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Hex form of [`ContentHasher::hash`].
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// Verify that data hashes to the expected hex digest.
    pub fn verify(&self, data: &[u8], expected_hex: &str) -> bool {
        self.hash_hex(data).eq_ignore_ascii_case(expected_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHasher::OBJECT.hash(b"hello world");
        let id2 = ContentHasher::OBJECT.hash(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let custom = ContentHasher {
            domain: "btcm-other-v1",
        };
        assert_ne!(ContentHasher::OBJECT.hash(b"x"), custom.hash(b"x"));
    }

    #[test]
    fn domain_hash_differs_from_plain_sha256() {
        assert_ne!(ContentHasher::OBJECT.hash(b"test"), sha256(b"test"));
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let key = ContentHasher::OBJECT.hash_hex(b"original");
        assert!(ContentHasher::OBJECT.verify(b"original", &key));
        assert!(ContentHasher::OBJECT.verify(b"original", &key.to_uppercase()));
        assert!(!ContentHasher::OBJECT.verify(b"tampered", &key));
    }
}
