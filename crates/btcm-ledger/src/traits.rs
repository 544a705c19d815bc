use btcm_types::{Block, Payload};

use crate::error::LedgerResult;

/// Read boundary for chain query and audit operations.
pub trait ChainReader: Send + Sync {
    /// Number of blocks, genesis included.
    fn len(&self) -> LedgerResult<u64>;

    fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// The most recently appended block.
    fn latest(&self) -> LedgerResult<Block>;

    /// The block at `index`, if present.
    fn get(&self, index: u64) -> LedgerResult<Option<Block>>;

    /// Snapshot of the whole chain, genesis first.
    fn blocks(&self) -> LedgerResult<Vec<Block>>;

    /// Fetch and decode the payload a block references.
    fn retrieve_payload(&self, block: &Block) -> LedgerResult<Payload>;
}
