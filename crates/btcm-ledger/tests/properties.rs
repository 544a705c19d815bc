//! Chain-level properties exercised through the public API.

use std::sync::Arc;

use btcm_crypto::{BlockHasher, HashChainVerifier};
use btcm_ledger::{ChainReader, Ledger, LedgerError, Rejection};
use btcm_store::{ContentStore, FsContentStore, InMemoryContentStore};
use btcm_types::{Block, BlockHash, ContentKey, Issuance, LedgerPolicy, Transaction};
use proptest::prelude::*;

fn open(store: Arc<dyn ContentStore>) -> Ledger {
    Ledger::open(
        store,
        LedgerPolicy::new(2 * 1024 * 1024, 120),
        Issuance::new("first_miner", 50).unwrap(),
    )
    .unwrap()
}

fn transfer(ledger: &Ledger, from: &str, to: &str, amount: u64) -> Block {
    let tx = Transaction::transfer(from, to, amount).unwrap();
    ledger.submit(&ledger.payload_for(vec![tx])).unwrap()
}

// ---------------------------------------------------------------------------
// Concrete scenario
// ---------------------------------------------------------------------------

#[test]
fn first_miner_then_user_transfer_then_stale_block() {
    let ledger = open(Arc::new(InMemoryContentStore::new()));
    let genesis = ledger.latest().unwrap();

    let genesis_payload = ledger.retrieve_payload(&genesis).unwrap();
    assert_eq!(genesis_payload.policy.max_block_size, 2_097_152);
    assert_eq!(genesis_payload.policy.target_interval, 120);
    assert_eq!(genesis_payload.transactions.len(), 1);
    assert_eq!(genesis_payload.transactions[0].recipient(), "first_miner");
    assert_eq!(genesis_payload.transactions[0].amount(), 50);
    assert!(genesis_payload.transactions[0].is_issuance());

    let tx = Transaction::transfer("user1", "user2", 10).unwrap();
    let payload = ledger.payload_for(vec![tx.clone()]);
    let block1 = ledger.create_block(&payload, &genesis.hash).unwrap();
    ledger.append(block1.clone()).unwrap();

    assert_eq!(ledger.len().unwrap(), 2);
    assert_eq!(block1.index, 1);
    assert_eq!(block1.previous_hash, genesis.hash);
    assert_eq!(ledger.retrieve_payload(&block1).unwrap().transactions, vec![tx]);

    // A block built against genesis after block 1 landed.
    let stale = ledger
        .create_block(
            &ledger.payload_for(vec![Transaction::transfer("user2", "user1", 5).unwrap()]),
            &genesis.hash,
        )
        .unwrap();
    let err = ledger.append(stale).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ValidationFailed(Rejection::PreviousHashMismatch { .. })
    ));
    assert_eq!(ledger.len().unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Durable backend
// ---------------------------------------------------------------------------

#[test]
fn chain_survives_reopen_with_filesystem_store() {
    let dir = tempfile::tempdir().unwrap();
    let objects = dir.path().join("objects");

    let persisted = {
        let ledger = open(Arc::new(FsContentStore::open(&objects).unwrap()));
        transfer(&ledger, "user1", "user2", 10);
        transfer(&ledger, "user2", "user3", 4);
        serde_json::to_vec(&ledger.blocks().unwrap()).unwrap()
    };

    let blocks: Vec<Block> = serde_json::from_slice(&persisted).unwrap();
    let restored = Ledger::restore(
        Arc::new(FsContentStore::open(&objects).unwrap()),
        LedgerPolicy::default(),
        blocks,
    )
    .unwrap();

    assert_eq!(restored.len().unwrap(), 3);
    let report = restored.validate_chain(true).unwrap();
    assert!(report.is_valid(), "{:?}", report.violations);

    let last = restored.latest().unwrap();
    let payload = restored.retrieve_payload(&last).unwrap();
    assert_eq!(payload.transactions[0].sender(), "user2");
    assert_eq!(payload.transactions[0].amount(), 4);

    // The restored ledger keeps appending.
    let next = transfer(&restored, "user3", "user1", 1);
    assert_eq!(next.index, 3);
}

#[test]
fn persisted_block_has_exactly_five_fields() {
    let ledger = open(Arc::new(InMemoryContentStore::new()));
    let value = serde_json::to_value(ledger.latest().unwrap()).unwrap();
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["hash", "index", "payload_reference", "previous_hash", "timestamp"]
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn build_chain(amounts: &[u64]) -> Ledger {
    let ledger = open(Arc::new(InMemoryContentStore::new()));
    for (i, amount) in amounts.iter().enumerate() {
        transfer(&ledger, &format!("acct{i}"), "sink", *amount);
    }
    ledger
}

/// Change exactly one of the five block fields. Returns `false` when the
/// chosen replacement happens to equal the current value.
fn tamper(block: &mut Block, field: usize, nudge: u64) -> bool {
    let before = block.clone();
    let digest = btcm_crypto::sha256(&nudge.to_be_bytes());
    match field {
        0 => block.index = block.index.wrapping_add(nudge),
        1 => block.previous_hash = BlockHash::from_digest(digest),
        2 => block.timestamp = block.timestamp.wrapping_add(nudge),
        3 => block.payload_reference = ContentKey::new(format!("tampered-{nudge}")),
        _ => block.hash = BlockHash::from_digest(digest),
    }
    *block != before
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn adjacent_blocks_are_linked(amounts in prop::collection::vec(0u64..1_000, 0..12)) {
        let ledger = build_chain(&amounts);
        let blocks = ledger.blocks().unwrap();

        prop_assert_eq!(blocks.len(), amounts.len() + 1);
        prop_assert!(blocks[0].previous_hash.is_genesis_parent());
        for pair in blocks.windows(2) {
            prop_assert_eq!(pair[1].index, pair[0].index + 1);
            prop_assert_eq!(&pair[1].previous_hash, &pair[0].hash);
        }
        for block in &blocks {
            prop_assert!(BlockHasher::verify_block(block));
        }
    }

    #[test]
    fn rejected_appends_never_change_length(
        amounts in prop::collection::vec(0u64..1_000, 1..6),
        bogus_index in 0u64..64,
    ) {
        let ledger = build_chain(&amounts);
        let before = ledger.len().unwrap();
        let mut candidate = ledger
            .create_block(
                &ledger.payload_for(vec![Transaction::transfer("x", "y", 1).unwrap()]),
                &ledger.latest().unwrap().hash,
            )
            .unwrap();
        prop_assume!(bogus_index != candidate.index);
        candidate.index = bogus_index;

        let err = ledger.append(candidate).unwrap_err();
        prop_assert!(err.is_rejection());
        prop_assert_eq!(ledger.len().unwrap(), before);
    }

    #[test]
    fn any_single_field_tamper_is_detected(
        amounts in prop::collection::vec(0u64..1_000, 1..6),
        pick in any::<prop::sample::Index>(),
        field in 0usize..5,
        nudge in 1u64..1_000,
    ) {
        let ledger = build_chain(&amounts);
        let mut blocks = ledger.blocks().unwrap();
        let target = pick.index(blocks.len());
        let block = &mut blocks[target];

        prop_assume!(tamper(block, field, nudge));

        prop_assert!(HashChainVerifier::verify_chain(&blocks).is_err());
        let restored = Ledger::restore(
            Arc::new(InMemoryContentStore::new()),
            LedgerPolicy::default(),
            blocks,
        );
        prop_assert!(matches!(restored, Err(LedgerError::Corrupt(_))));
    }

    #[test]
    fn tampered_candidate_is_rejected_by_append(
        amounts in prop::collection::vec(0u64..1_000, 0..6),
        field in 0usize..5,
        nudge in 1u64..1_000,
    ) {
        let ledger = build_chain(&amounts);
        let before = ledger.blocks().unwrap();
        let mut candidate = ledger
            .create_block(
                &ledger.payload_for(vec![Transaction::transfer("x", "y", 1).unwrap()]),
                &ledger.latest().unwrap().hash,
            )
            .unwrap();
        prop_assume!(tamper(&mut candidate, field, nudge));

        let err = ledger.append(candidate).unwrap_err();
        prop_assert!(err.is_rejection(), "{err:?}");
        prop_assert_eq!(ledger.len().unwrap(), before.len() as u64);
        prop_assert_eq!(ledger.blocks().unwrap(), before);
    }
}
