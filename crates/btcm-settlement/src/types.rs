use std::fmt;

use btcm_crypto::sha256;
use serde::{Deserialize, Serialize};

/// Payment request string handed to the payer (`lnbcrt...`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceToken(String);

impl InvoiceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InvoiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvoiceToken({})", self.0)
    }
}

impl fmt::Display for InvoiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A payable request issued by the settlement network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub token: InvoiceToken,
    pub amount: u64,
    pub memo: String,
    /// Hex SHA-256 of the preimage revealed on payment.
    pub payment_hash: String,
    /// Seconds since UNIX epoch.
    pub expires_at: u64,
}

impl Invoice {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Evidence that an invoice was paid: the preimage of its payment hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub payment_hash: String,
    pub preimage: String,
}

impl PaymentProof {
    /// Returns `true` if SHA-256 of the preimage equals the payment hash.
    pub fn verify(&self) -> bool {
        match hex::decode(&self.preimage) {
            Ok(preimage) => hex::encode(sha256(&preimage)).eq_ignore_ascii_case(&self.payment_hash),
            Err(_) => false,
        }
    }

    /// Returns `true` if this proof pays `invoice`.
    pub fn pays(&self, invoice: &Invoice) -> bool {
        self.payment_hash.eq_ignore_ascii_case(&invoice.payment_hash) && self.verify()
    }
}
