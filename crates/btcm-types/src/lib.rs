//! Foundation types for the BTC-Mobile ledger.
//!
//! This crate provides the record types shared by every other `btcm-*` crate.
//! It performs no hashing and no I/O: hashing lives in `btcm-crypto`, storage
//! in `btcm-store`.
//!
//! # Key Types
//!
//! - [`Block`] — Hash-linked ledger entry referencing an externalized payload
//! - [`BlockHash`] — Hex-encoded SHA-256 block digest (or the genesis sentinel)
//! - [`ContentKey`] — Opaque content-store address of a payload
//! - [`Transaction`] — Value transfer: ordinary [`Transfer`] or [`Issuance`]
//! - [`LedgerPolicy`] — Advisory block-size / block-interval configuration
//! - [`Payload`] — Transactions plus the policy snapshot stored off-ledger

pub mod block;
pub mod error;
pub mod object;
pub mod payload;
pub mod policy;
pub mod temporal;
pub mod transaction;

pub use block::{Block, BlockHash};
pub use error::TypeError;
pub use object::ContentKey;
pub use payload::{Payload, SettlementReference};
pub use policy::LedgerPolicy;
pub use temporal::unix_now;
pub use transaction::{Issuance, Transaction, Transfer, COINBASE_SENDER};
