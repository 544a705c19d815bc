use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use btcm_crypto::{block_hash, BlockHasher, HashChainVerifier};
use btcm_store::ContentStore;
use btcm_types::{
    unix_now, Block, BlockHash, ContentKey, Issuance, LedgerPolicy, Payload, Transaction,
};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult, Rejection};
use crate::traits::ChainReader;
use crate::validation::{ChainValidator, ValidationReport};

/// Lifecycle of a [`Ledger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerState {
    /// No genesis block yet.
    Uninitialized,
    /// Genesis present; accepts appends for the rest of its life.
    Active,
}

/// Append-only, hash-linked chain of blocks with externalized payloads.
///
/// Writers are serialized by a single lock held across
/// "read latest, validate, push". Payload storage happens in
/// [`Ledger::create_block`], before that lock is taken, so slow store I/O
/// never blocks other writers' append decisions.
pub struct Ledger {
    store: Arc<dyn ContentStore>,
    policy: LedgerPolicy,
    chain: RwLock<Vec<Block>>,
}

impl Ledger {
    /// Create an empty ledger. Call [`Ledger::create_genesis`] before anything
    /// else.
    pub fn new(store: Arc<dyn ContentStore>, policy: LedgerPolicy) -> Self {
        Self {
            store,
            policy,
            chain: RwLock::new(Vec::new()),
        }
    }

    /// Create a ledger and its genesis block in one step.
    pub fn open(
        store: Arc<dyn ContentStore>,
        policy: LedgerPolicy,
        reward: Issuance,
    ) -> LedgerResult<Self> {
        let ledger = Self::new(store, policy);
        ledger.create_genesis(reward)?;
        Ok(ledger)
    }

    /// Rebuild a ledger from persisted blocks.
    ///
    /// The blocks must form a valid chain starting at genesis; payloads are
    /// not fetched (see [`Ledger::validate_chain`] for that).
    pub fn restore(
        store: Arc<dyn ContentStore>,
        policy: LedgerPolicy,
        blocks: Vec<Block>,
    ) -> LedgerResult<Self> {
        HashChainVerifier::verify_chain(&blocks)?;
        info!(blocks = blocks.len(), "restored ledger");
        Ok(Self {
            store,
            policy,
            chain: RwLock::new(blocks),
        })
    }

    /// Rebuild a ledger from persisted blocks, taking the policy from the
    /// genesis payload.
    ///
    /// The chain is verified before the store is read.
    pub fn resume(store: Arc<dyn ContentStore>, blocks: Vec<Block>) -> LedgerResult<Self> {
        HashChainVerifier::verify_chain(&blocks)?;
        let genesis = blocks.first().ok_or(LedgerError::EmptyChain)?;
        let policy = fetch_payload(store.as_ref(), genesis)?.policy;
        info!(blocks = blocks.len(), "resumed ledger");
        Ok(Self {
            store,
            policy,
            chain: RwLock::new(blocks),
        })
    }

    /// The policy attached at construction.
    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    pub fn state(&self) -> LedgerResult<LedgerState> {
        Ok(if self.read_chain()?.is_empty() {
            LedgerState::Uninitialized
        } else {
            LedgerState::Active
        })
    }

    /// Payload carrying `transactions` and this ledger's policy snapshot.
    pub fn payload_for(&self, transactions: Vec<Transaction>) -> Payload {
        Payload::new(transactions, self.policy)
    }

    /// Build, store and append block 0.
    ///
    /// The genesis payload is the single `reward` issuance plus the policy
    /// snapshot. Fails with `AlreadyInitialized` if the chain is not empty.
    pub fn create_genesis(&self, reward: Issuance) -> LedgerResult<Block> {
        if !self.read_chain()?.is_empty() {
            return Err(LedgerError::AlreadyInitialized);
        }

        let payload = self.payload_for(vec![Transaction::Issuance(reward)]);
        let reference = self.put_payload(&payload)?;
        let previous_hash = BlockHash::genesis_parent();
        let timestamp = unix_now();
        let genesis = Block {
            index: 0,
            hash: block_hash(0, &previous_hash, timestamp, &reference),
            previous_hash,
            timestamp,
            payload_reference: reference,
        };

        let mut chain = self.write_chain()?;
        if !chain.is_empty() {
            return Err(LedgerError::AlreadyInitialized);
        }
        chain.push(genesis.clone());
        info!(
            hash = %genesis.hash.short(),
            payload = %genesis.payload_reference.short(),
            "created genesis block"
        );
        Ok(genesis)
    }

    /// Store `payload` and build the block that would follow the current
    /// chain with the given parent. Does not append.
    pub fn create_block(
        &self,
        payload: &Payload,
        previous_hash: &BlockHash,
    ) -> LedgerResult<Block> {
        let reference = self.put_payload(payload)?;
        let index = self.read_chain()?.len() as u64;
        let timestamp = unix_now();
        let hash = block_hash(index, previous_hash, timestamp, &reference);

        debug!(index, hash = %hash.short(), "created block");
        Ok(Block {
            index,
            previous_hash: previous_hash.clone(),
            timestamp,
            payload_reference: reference,
            hash,
        })
    }

    /// Validate `candidate` against the latest block and append it.
    ///
    /// Checks, in order: index continuity, previous-hash linkage, hash
    /// recomputation. On failure the chain is untouched and the error names
    /// the check that failed.
    pub fn append(&self, candidate: Block) -> LedgerResult<()> {
        let mut chain = self.write_chain()?;
        let latest = chain.last().ok_or(LedgerError::EmptyChain)?;

        if let Err(rejection) = check_successor(latest, &candidate) {
            warn!(index = candidate.index, %rejection, "rejected block");
            return Err(rejection.into());
        }

        debug!(
            index = candidate.index,
            hash = %candidate.hash.short(),
            "appended block"
        );
        chain.push(candidate);
        Ok(())
    }

    /// Build a block on top of the current latest block and append it.
    ///
    /// If another writer appends in between, the block is rejected with
    /// `IndexDiscontinuity` and nothing is written to the chain; the caller
    /// may simply retry.
    pub fn submit(&self, payload: &Payload) -> LedgerResult<Block> {
        let parent = self.latest()?.hash;
        let block = self.create_block(payload, &parent)?;
        self.append(block.clone())?;
        Ok(block)
    }

    /// Full-chain audit. With `verify_payloads`, every payload reference is
    /// also fetched and decoded.
    pub fn validate_chain(&self, verify_payloads: bool) -> LedgerResult<ValidationReport> {
        if verify_payloads {
            ChainValidator::validate_with_payloads(self)
        } else {
            ChainValidator::validate(self)
        }
    }

    fn put_payload(&self, payload: &Payload) -> LedgerResult<ContentKey> {
        let bytes = payload
            .to_canonical_bytes()
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(self.store.put(&bytes)?)
    }

    fn read_chain(&self) -> LedgerResult<RwLockReadGuard<'_, Vec<Block>>> {
        self.chain.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_chain(&self) -> LedgerResult<RwLockWriteGuard<'_, Vec<Block>>> {
        self.chain.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl ChainReader for Ledger {
    fn len(&self) -> LedgerResult<u64> {
        Ok(self.read_chain()?.len() as u64)
    }

    /// Fails with `EmptyChain` before genesis.
    fn latest(&self) -> LedgerResult<Block> {
        self.read_chain()?
            .last()
            .cloned()
            .ok_or(LedgerError::EmptyChain)
    }

    fn get(&self, index: u64) -> LedgerResult<Option<Block>> {
        let chain = self.read_chain()?;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|i| chain.get(i))
            .cloned())
    }

    fn blocks(&self) -> LedgerResult<Vec<Block>> {
        Ok(self.read_chain()?.clone())
    }

    fn retrieve_payload(&self, block: &Block) -> LedgerResult<Payload> {
        fetch_payload(self.store.as_ref(), block)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.chain.read().map(|c| c.len()).unwrap_or_default();
        f.debug_struct("Ledger")
            .field("blocks", &len)
            .field("policy", &self.policy)
            .finish()
    }
}

pub(crate) fn fetch_payload(store: &dyn ContentStore, block: &Block) -> LedgerResult<Payload> {
    let bytes = store.get(&block.payload_reference)?;
    Payload::from_bytes(&bytes).map_err(|e| LedgerError::Deserialization(e.to_string()))
}

/// The three append checks, in order.
pub(crate) fn check_successor(latest: &Block, candidate: &Block) -> Result<(), Rejection> {
    let expected = latest.index.saturating_add(1);
    if candidate.index != expected {
        return Err(Rejection::IndexDiscontinuity {
            expected,
            found: candidate.index,
        });
    }

    if candidate.previous_hash != latest.hash {
        return Err(Rejection::PreviousHashMismatch {
            expected: latest.hash.clone(),
            found: candidate.previous_hash.clone(),
        });
    }

    let computed = BlockHasher::hash_block(candidate);
    if computed != candidate.hash {
        return Err(Rejection::HashMismatch {
            computed,
            stored: candidate.hash.clone(),
        });
    }

    Ok(())
}
