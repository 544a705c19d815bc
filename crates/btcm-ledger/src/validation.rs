use btcm_crypto::BlockHasher;
use btcm_store::StoreError;
use btcm_types::Block;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::ChainReader;

/// Result of a full-chain audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub block_count: u64,
    pub hash_chain_valid: bool,
    pub indices_contiguous: bool,
    /// `None` when payloads were not checked.
    pub payloads_resolved: Option<bool>,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Position in the chain (not the block's own `index` field).
    pub position: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    BadGenesis,
    IndexGap,
    BrokenLink,
    HashMismatch,
    MissingPayload,
    UndecodablePayload,
}

/// Chain integrity validator.
///
/// Unlike `append`, which stops at the first failed check, the validator walks
/// the whole chain and reports every violation it finds.
pub struct ChainValidator;

impl ChainValidator {
    /// Check genesis shape, index continuity, hash linkage and hash
    /// recomputation for every block.
    pub fn validate<R: ChainReader + ?Sized>(reader: &R) -> LedgerResult<ValidationReport> {
        let blocks = reader.blocks()?;
        Ok(Self::check_structure(&blocks))
    }

    /// Structural checks plus: every payload reference resolves in the store
    /// and decodes as a payload.
    ///
    /// An unreachable store aborts the audit with an error; a missing or
    /// corrupt object is recorded as a violation.
    pub fn validate_with_payloads<R: ChainReader + ?Sized>(
        reader: &R,
    ) -> LedgerResult<ValidationReport> {
        let blocks = reader.blocks()?;
        let mut report = Self::check_structure(&blocks);
        let mut resolved = true;

        for (position, block) in blocks.iter().enumerate() {
            let position = position as u64;
            match reader.retrieve_payload(block) {
                Ok(_) => {}
                Err(LedgerError::Store(StoreError::NotFound(key))) => {
                    resolved = false;
                    report.violations.push(Violation {
                        position,
                        kind: ViolationKind::MissingPayload,
                        description: format!("payload {} not in store", key.short()),
                    });
                }
                Err(LedgerError::Store(StoreError::HashMismatch { key, .. })) => {
                    resolved = false;
                    report.violations.push(Violation {
                        position,
                        kind: ViolationKind::UndecodablePayload,
                        description: format!("payload {} is corrupt in store", key.short()),
                    });
                }
                Err(LedgerError::Deserialization(reason)) => {
                    resolved = false;
                    report.violations.push(Violation {
                        position,
                        kind: ViolationKind::UndecodablePayload,
                        description: reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        report.payloads_resolved = Some(resolved);
        Ok(report)
    }

    fn check_structure(blocks: &[Block]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut indices_contiguous = true;

        for (position, block) in blocks.iter().enumerate() {
            let position = position as u64;

            if position == 0 {
                if block.index != 0 || !block.previous_hash.is_genesis_parent() {
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::BadGenesis,
                        description: format!(
                            "genesis has index {} and parent {}",
                            block.index,
                            block.previous_hash.short()
                        ),
                    });
                }
            } else {
                let previous = &blocks[position as usize - 1];

                let expected = previous.index.saturating_add(1);
                if block.index != expected {
                    indices_contiguous = false;
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::IndexGap,
                        description: format!("expected index {expected}, got {}", block.index),
                    });
                }

                if block.previous_hash != previous.hash {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::BrokenLink,
                        description: "previous hash link mismatch".into(),
                    });
                }
            }

            let computed = BlockHasher::hash_block(block);
            if computed != block.hash {
                hash_chain_valid = false;
                violations.push(Violation {
                    position,
                    kind: ViolationKind::HashMismatch,
                    description: format!(
                        "block hash {} does not match computed {}",
                        block.hash.short(),
                        computed.short()
                    ),
                });
            }
        }

        ValidationReport {
            block_count: blocks.len() as u64,
            hash_chain_valid,
            indices_contiguous,
            payloads_resolved: None,
            violations,
        }
    }
}
