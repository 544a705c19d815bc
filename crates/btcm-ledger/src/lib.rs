//! Append-only, hash-linked block ledger for BTC-Mobile.
//!
//! This crate is the heart of BTC-Mobile. It provides:
//! - Genesis creation with a policy snapshot and issuance reward
//! - Block construction over externalized payloads (`create_block`)
//! - Validated append with tagged rejections (`append`)
//! - Payload retrieval through the content store
//! - Full-chain audit (`ChainValidator`) and restore from persisted blocks

pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod traits;
pub mod validation;

pub use error::{LedgerError, LedgerResult, Rejection};
pub use ledger::{Ledger, LedgerState};
pub use snapshot::ChainSnapshot;
pub use traits::ChainReader;
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
