use std::sync::Arc;

use btcm_store::ContentStore;
use btcm_types::{Block, Payload};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::fetch_payload;
use crate::traits::ChainReader;

/// Read-only view over a block list that has not been verified.
///
/// [`Ledger::restore`](crate::Ledger::restore) refuses a broken chain
/// outright; a snapshot lets [`ChainValidator`](crate::ChainValidator) walk
/// the same blocks and report every problem instead.
pub struct ChainSnapshot {
    blocks: Vec<Block>,
    store: Arc<dyn ContentStore>,
}

impl ChainSnapshot {
    pub fn new(blocks: Vec<Block>, store: Arc<dyn ContentStore>) -> Self {
        Self { blocks, store }
    }
}

impl ChainReader for ChainSnapshot {
    fn len(&self) -> LedgerResult<u64> {
        Ok(self.blocks.len() as u64)
    }

    fn latest(&self) -> LedgerResult<Block> {
        self.blocks.last().cloned().ok_or(LedgerError::EmptyChain)
    }

    fn get(&self, index: u64) -> LedgerResult<Option<Block>> {
        Ok(usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get(i))
            .cloned())
    }

    fn blocks(&self) -> LedgerResult<Vec<Block>> {
        Ok(self.blocks.clone())
    }

    fn retrieve_payload(&self, block: &Block) -> LedgerResult<Payload> {
        fetch_payload(self.store.as_ref(), block)
    }
}

impl std::fmt::Debug for ChainSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSnapshot")
            .field("blocks", &self.blocks.len())
            .finish()
    }
}
