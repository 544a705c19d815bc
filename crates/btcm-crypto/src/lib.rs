//! Hashing primitives for the BTC-Mobile ledger.
//!
//! Provides the block hash function, domain-separated SHA-256 content hashing
//! for store backends, and hash chain verification.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{block_hash, BlockHasher, ChainError, HashChainVerifier};
pub use hasher::{sha256, ContentHasher};
