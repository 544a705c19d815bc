//! High-level SDK for BTC-Mobile.
//!
//! [`Node`] is the composition root: it owns one [`Ledger`], one
//! [`SettlementGateway`] and the [`NodeConfig`] they were built from, and
//! exposes the operations an application needs: on-chain transfers,
//! off-chain payments, and settled payments recorded on chain.
//!
//! ```no_run
//! # async fn run() -> btcm_sdk::SdkResult<()> {
//! use btcm_sdk::{Node, NodeConfig};
//!
//! let node = Node::in_memory(NodeConfig::default())?;
//! node.transfer("user1", "user2", 10)?;
//! let proof = node.pay_off_chain(1_000, "coffee").await?;
//! assert!(proof.verify());
//! # Ok(())
//! # }
//! ```

pub mod chain_file;
pub mod config;
pub mod error;
pub mod node;

pub use chain_file::ChainFile;
pub use config::{GenesisConfig, NodeConfig};
pub use error::{SdkError, SdkResult};
pub use node::{Node, CHAIN_FILE, CONFIG_FILE, OBJECTS_DIR};

// Re-export key types
pub use btcm_ledger::{
    ChainReader, Ledger, LedgerError, Rejection, ValidationReport, Violation, ViolationKind,
};
pub use btcm_settlement::{GatewayConfig, PaymentProof, SettlementError, SettlementGateway};
pub use btcm_types::{Block, BlockHash, LedgerPolicy, Payload, Transaction};
