use btcm_crypto::ChainError;
use btcm_store::StoreError;
use btcm_types::BlockHash;

/// Why a candidate block was refused by `append`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("index discontinuity: expected {expected}, found {found}")]
    IndexDiscontinuity { expected: u64, found: u64 },

    #[error("previous hash mismatch: expected {}, found {}", .expected.short(), .found.short())]
    PreviousHashMismatch { expected: BlockHash, found: BlockHash },

    #[error("hash mismatch: computed {}, stored {}", .computed.short(), .stored.short())]
    HashMismatch { computed: BlockHash, stored: BlockHash },
}

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("block rejected: {0}")]
    ValidationFailed(#[from] Rejection),

    #[error("chain is empty: no genesis block")]
    EmptyChain,

    #[error("genesis block already exists")]
    AlreadyInitialized,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("payload could not be decoded: {0}")]
    Deserialization(String),

    #[error("persisted chain is corrupt: {0}")]
    Corrupt(#[from] ChainError),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// Returns `true` if a block was refused by validation, as opposed to an
    /// I/O or state error.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }

    /// The specific check a rejected block failed, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::ValidationFailed(r) => Some(r),
            _ => None,
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use btcm_types::ContentKey;

    #[test]
    fn rejection_is_distinguishable_from_io() {
        let rejected = LedgerError::from(Rejection::IndexDiscontinuity {
            expected: 2,
            found: 1,
        });
        assert!(rejected.is_rejection());
        assert!(rejected.rejection().is_some());

        let io = LedgerError::from(StoreError::NotFound(ContentKey::new("k")));
        assert!(!io.is_rejection());
        assert!(io.rejection().is_none());
    }

    #[test]
    fn display_uses_short_hashes() {
        let err = Rejection::PreviousHashMismatch {
            expected: BlockHash::from_digest([0xaa; 32]),
            found: BlockHash::from_digest([0xbb; 32]),
        };
        assert_eq!(
            err.to_string(),
            "previous hash mismatch: expected aaaaaaaa, found bbbbbbbb"
        );
    }
}
