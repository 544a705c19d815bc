use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("sender {0:?} is reserved for issuance")]
    ReservedSender(String),

    #[error("account identifier must not be empty")]
    EmptyAccount,

    #[error("serialization error: {0}")]
    Serialization(String),
}
