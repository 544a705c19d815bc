use btcm_types::{Block, BlockHash, ContentKey};
use sha2::{Digest, Sha256};

const BLOCK_DOMAIN: &[u8] = b"btcm-block-v1:";

/// Compute a block hash.
///
/// Fields are encoded without ambiguity: integers as 8-byte big-endian, strings
/// as an 8-byte big-endian length followed by their UTF-8 bytes. Without the
/// length prefix, `(1, "23")` and `(12, "3")` would hash identically.
pub fn block_hash(
    index: u64,
    previous_hash: &BlockHash,
    timestamp: u64,
    payload_reference: &ContentKey,
) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(BLOCK_DOMAIN);
    hasher.update(index.to_be_bytes());
    update_prefixed(&mut hasher, previous_hash.as_bytes());
    hasher.update(timestamp.to_be_bytes());
    update_prefixed(&mut hasher, payload_reference.as_bytes());
    BlockHash::from_digest(hasher.finalize().into())
}

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Block-level convenience over [`block_hash`].
pub struct BlockHasher;

impl BlockHasher {
    /// Recompute the hash of `block` from its first four fields.
    pub fn hash_block(block: &Block) -> BlockHash {
        block_hash(
            block.index,
            &block.previous_hash,
            block.timestamp,
            &block.payload_reference,
        )
    }

    /// Returns `true` if the stored hash matches the recomputed one.
    pub fn verify_block(block: &Block) -> bool {
        Self::hash_block(block) == block.hash
    }
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of blocks forms a valid chain: block 0 is a
/// genesis block, every index is its predecessor's plus one, every
/// `previous_hash` is its predecessor's `hash`, and every `hash` recomputes.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain, stopping at the first violation.
    pub fn verify_chain(blocks: &[Block]) -> Result<(), ChainError> {
        let Some(genesis) = blocks.first() else {
            return Ok(());
        };

        if genesis.index != 0 {
            return Err(ChainError::GenesisIndex {
                found: genesis.index,
            });
        }
        if !genesis.previous_hash.is_genesis_parent() {
            return Err(ChainError::GenesisParent);
        }
        if !BlockHasher::verify_block(genesis) {
            return Err(ChainError::HashMismatch { index: 0 });
        }

        for pair in blocks.windows(2) {
            Self::verify_link(&pair[0], &pair[1])?;
        }

        Ok(())
    }

    /// Verify that `current` correctly extends `previous`.
    pub fn verify_link(previous: &Block, current: &Block) -> Result<(), ChainError> {
        let expected = previous.index.saturating_add(1);
        if current.index != expected {
            return Err(ChainError::IndexGap {
                expected,
                found: current.index,
            });
        }
        if current.previous_hash != previous.hash {
            return Err(ChainError::BrokenLink {
                index: current.index,
            });
        }
        if !BlockHasher::verify_block(current) {
            return Err(ChainError::HashMismatch {
                index: current.index,
            });
        }
        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("first block has index {found}, expected 0")]
    GenesisIndex { found: u64 },

    #[error("first block does not use the genesis parent sentinel")]
    GenesisParent,

    #[error("index gap: expected {expected}, found {found}")]
    IndexGap { expected: u64, found: u64 },

    #[error("broken link at index {index}: previous_hash does not match")]
    BrokenLink { index: u64 },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build_chain(count: usize) -> Vec<Block> {
        let mut chain: Vec<Block> = Vec::new();
        for i in 0..count as u64 {
            let previous_hash = chain
                .last()
                .map(|b| b.hash.clone())
                .unwrap_or_else(BlockHash::genesis_parent);
            let payload_reference = ContentKey::new(format!("payload-{i}"));
            let timestamp = 1_700_000_000 + i;
            let hash = block_hash(i, &previous_hash, timestamp, &payload_reference);
            chain.push(Block {
                index: i,
                previous_hash,
                timestamp,
                payload_reference,
                hash,
            });
        }
        chain
    }

    #[test]
    fn hash_is_64_hex_chars() {
        let h = block_hash(0, &BlockHash::genesis_parent(), 0, &ContentKey::new("k"));
        assert_eq!(h.as_str().len(), 64);
        assert!(BlockHash::from_hex(h.as_str()).is_ok());
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let key = ContentKey::new("k");
        let a = block_hash(1, &BlockHash::new_unchecked("23"), 5, &key);
        let b = block_hash(12, &BlockHash::new_unchecked("3"), 5, &key);
        assert_ne!(a, b);

        let c = block_hash(0, &BlockHash::new_unchecked("ab"), 1, &ContentKey::new("c"));
        let d = block_hash(0, &BlockHash::new_unchecked("a"), 1, &ContentKey::new("bc"));
        assert_ne!(c, d);
    }

    #[test]
    fn empty_chain_is_valid() {
        assert!(HashChainVerifier::verify_chain(&[]).is_ok());
    }

    #[test]
    fn single_and_multi_block_chains() {
        assert!(HashChainVerifier::verify_chain(&build_chain(1)).is_ok());
        assert!(HashChainVerifier::verify_chain(&build_chain(10)).is_ok());
    }

    #[test]
    fn genesis_must_start_at_zero() {
        let chain = build_chain(3);
        let err = HashChainVerifier::verify_chain(&chain[1..]).unwrap_err();
        assert_eq!(err, ChainError::GenesisIndex { found: 1 });
    }

    #[test]
    fn genesis_must_use_sentinel_parent() {
        let mut chain = build_chain(1);
        chain[0].previous_hash = BlockHash::from_digest([1; 32]);
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::GenesisParent
        );
    }

    #[test]
    fn index_gap_detected() {
        let mut chain = build_chain(3);
        chain.remove(1);
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::IndexGap {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].previous_hash = BlockHash::from_digest([99; 32]);
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::BrokenLink { index: 2 }
        );
    }

    #[test]
    fn tampered_reference_detected() {
        let mut chain = build_chain(3);
        chain[1].payload_reference = ContentKey::new("tampered");
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::HashMismatch { index: 1 }
        );
    }

    proptest! {
        #[test]
        fn any_single_field_change_alters_the_hash(
            index in any::<u64>(),
            prev in "[0-9a-f]{1,64}",
            timestamp in any::<u64>(),
            key in "[A-Za-z0-9]{1,46}",
            field in 0usize..4,
        ) {
            let prev = BlockHash::new_unchecked(prev);
            let key = ContentKey::new(key);
            let original = block_hash(index, &prev, timestamp, &key);

            let mutated = match field {
                0 => block_hash(index.wrapping_add(1), &prev, timestamp, &key),
                1 => block_hash(index, &BlockHash::new_unchecked(format!("{prev}0")), timestamp, &key),
                2 => block_hash(index, &prev, timestamp.wrapping_add(1), &key),
                _ => block_hash(index, &prev, timestamp, &ContentKey::new(format!("{key}x"))),
            };
            prop_assert_ne!(original, mutated);
        }

        #[test]
        fn recomputation_is_stable(
            index in any::<u64>(),
            timestamp in any::<u64>(),
            key in "[A-Za-z0-9]{1,46}",
        ) {
            let prev = BlockHash::genesis_parent();
            let key = ContentKey::new(key);
            prop_assert_eq!(
                block_hash(index, &prev, timestamp, &key),
                block_hash(index, &prev, timestamp, &key)
            );
        }
    }
}
