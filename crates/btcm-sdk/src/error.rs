use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("node not initialized at {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("node already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] btcm_types::TypeError),

    #[error("payment proof does not match invoice {0}")]
    InvalidProof(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// The gateway settled the payment but the ledger did not record it.
    /// The evidence is kept so the caller can record it later.
    #[error("payment for invoice {invoice} settled but not recorded: {source}")]
    Unrecorded {
        invoice: String,
        proof: btcm_settlement::PaymentProof,
        #[source]
        source: Box<SdkError>,
    },

    #[error("chain file error: {0}")]
    ChainFile(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] btcm_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] btcm_store::StoreError),

    #[error("settlement error: {0}")]
    Settlement(#[from] btcm_settlement::SettlementError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
