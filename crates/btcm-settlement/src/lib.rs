//! Off-chain settlement boundary for BTC-Mobile.
//!
//! Payments that should not wait for a block go through a
//! [`SettlementGateway`]: the payee issues an [`Invoice`], the payer settles
//! it and receives a [`PaymentProof`] (the preimage of the invoice's payment
//! hash). Settlement never touches the ledger; recording a settled payment on
//! chain is the caller's decision.
//!
//! [`InMemoryGateway`] is a self-contained implementation with the same
//! failure surface as a networked node.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use config::GatewayConfig;
pub use error::{SettlementError, SettlementResult};
pub use memory::InMemoryGateway;
pub use traits::SettlementGateway;
pub use types::{Invoice, InvoiceToken, PaymentProof};
