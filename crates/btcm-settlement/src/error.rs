use thiserror::Error;

/// Errors from the off-chain settlement boundary.
///
/// These never describe ledger state: a failed settlement leaves the chain
/// untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// Connection refused, authentication rejected, remote error or timeout.
    #[error("settlement gateway unavailable: {0}")]
    Unavailable(String),

    #[error("invalid invoice amount: {0}")]
    InvalidAmount(u64),

    #[error("invoice expired")]
    InvoiceExpired,

    #[error("unknown invoice")]
    InvoiceUnknown,

    #[error("invoice already settled")]
    AlreadySettled,
}

impl SettlementError {
    /// Returns `true` for transport-level failures worth retrying later.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type SettlementResult<T> = Result<T, SettlementError>;
