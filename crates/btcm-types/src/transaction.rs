use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Sender reserved for newly created value.
pub const COINBASE_SENDER: &str = "coinbase";

/// Ordinary value movement between two accounts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transfer {
    sender: String,
    recipient: String,
    amount: u64,
}

impl Transfer {
    /// Create a transfer. The sender may not be the coinbase sentinel.
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<Self, TypeError> {
        let sender = sender.into();
        let recipient = recipient.into();
        if sender == COINBASE_SENDER {
            return Err(TypeError::ReservedSender(sender));
        }
        if sender.is_empty() || recipient.is_empty() {
            return Err(TypeError::EmptyAccount);
        }
        Ok(Self {
            sender,
            recipient,
            amount,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Creation of new value (block reward). Has no originating account.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Issuance {
    recipient: String,
    amount: u64,
}

impl Issuance {
    pub fn new(recipient: impl Into<String>, amount: u64) -> Result<Self, TypeError> {
        let recipient = recipient.into();
        if recipient.is_empty() {
            return Err(TypeError::EmptyAccount);
        }
        Ok(Self { recipient, amount })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// A value-transfer entry carried in a block payload.
///
/// On the wire every variant is the flat record
/// `{"sender", "recipient", "amount"}`; an issuance is the record whose
/// sender is [`COINBASE_SENDER`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "TransactionRecord", try_from = "TransactionRecord")]
pub enum Transaction {
    Transfer(Transfer),
    Issuance(Issuance),
}

impl Transaction {
    /// Shorthand for `Transaction::Transfer(Transfer::new(..)?)`.
    pub fn transfer(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<Self, TypeError> {
        Transfer::new(sender, recipient, amount).map(Self::Transfer)
    }

    /// Shorthand for `Transaction::Issuance(Issuance::new(..)?)`.
    pub fn issuance(recipient: impl Into<String>, amount: u64) -> Result<Self, TypeError> {
        Issuance::new(recipient, amount).map(Self::Issuance)
    }

    pub fn sender(&self) -> &str {
        match self {
            Self::Transfer(t) => t.sender(),
            Self::Issuance(_) => COINBASE_SENDER,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Transfer(t) => t.recipient(),
            Self::Issuance(i) => i.recipient(),
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer(t) => t.amount(),
            Self::Issuance(i) => i.amount(),
        }
    }

    pub fn is_issuance(&self) -> bool {
        matches!(self, Self::Issuance(_))
    }
}

impl From<Transfer> for Transaction {
    fn from(t: Transfer) -> Self {
        Self::Transfer(t)
    }
}

impl From<Issuance> for Transaction {
    fn from(i: Issuance) -> Self {
        Self::Issuance(i)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.sender(),
            self.recipient(),
            self.amount()
        )
    }
}

#[derive(Serialize, Deserialize)]
struct TransactionRecord {
    sender: String,
    recipient: String,
    amount: u64,
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        match tx {
            Transaction::Transfer(t) => Self {
                sender: t.sender,
                recipient: t.recipient,
                amount: t.amount,
            },
            Transaction::Issuance(i) => Self {
                sender: COINBASE_SENDER.to_string(),
                recipient: i.recipient,
                amount: i.amount,
            },
        }
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = TypeError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        if record.sender == COINBASE_SENDER {
            Transaction::issuance(record.recipient, record.amount)
        } else {
            Transaction::transfer(record.sender, record.recipient, record.amount)
        }
    }
}
