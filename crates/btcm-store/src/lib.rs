//! Content-addressed payload storage for the BTC-Mobile ledger.
//!
//! The ledger keeps only a reference to each block's payload; the payload
//! bytes live in a [`ContentStore`]. The store is a pure put/get service: it
//! never interprets what it holds.
//!
//! # Storage Backends
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsContentStore`] -- one file per object under a root directory
//!
//! Both key objects by the hex SHA-256 of their bytes (domain-separated via
//! `btcm_crypto::ContentHasher`), so writing the same bytes twice yields the
//! same key and a single stored copy.
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written.
//! 2. `get(put(bytes)) == bytes`.
//! 3. Concurrent reads are always safe.
//! 4. Backend failures are propagated to the caller, never retried here.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
