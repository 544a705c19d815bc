use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::policy::LedgerPolicy;
use crate::transaction::Transaction;

/// Off-chain payment a block anchors on-chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReference {
    /// Payment request the gateway issued.
    pub invoice: String,
    /// Hex SHA-256 payment hash.
    pub payment_hash: String,
    /// Hex preimage revealed on settlement.
    pub preimage: String,
}

/// Block content held in the content store.
///
/// Encoded as `{"transactions": [...], "block_size": .., "difficulty": ..}`,
/// plus `"settlement"` when the block records an off-chain payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub transactions: Vec<Transaction>,
    #[serde(flatten)]
    pub policy: LedgerPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementReference>,
}

impl Payload {
    pub fn new(transactions: Vec<Transaction>, policy: LedgerPolicy) -> Self {
        Self {
            transactions,
            policy,
            settlement: None,
        }
    }

    /// Attach the off-chain payment this payload records.
    pub fn with_settlement(mut self, settlement: SettlementReference) -> Self {
        self.settlement = Some(settlement);
        self
    }

    /// Serialized form handed to the content store.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode bytes previously produced by [`Payload::to_canonical_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_payload() -> Payload {
        Payload::new(
            vec![Transaction::issuance("first_miner", 50).unwrap()],
            LedgerPolicy::new(2_097_152, 120),
        )
    }

    #[test]
    fn encoding_matches_payload_shape() {
        let json: serde_json::Value =
            serde_json::from_slice(&genesis_payload().to_canonical_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "transactions": [
                    {"sender": "coinbase", "recipient": "first_miner", "amount": 50}
                ],
                "block_size": 2097152,
                "difficulty": 120
            })
        );
    }

    #[test]
    fn canonical_bytes_are_stable() {
        let a = genesis_payload().to_canonical_bytes().unwrap();
        let b = genesis_payload().to_canonical_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn decode_restores_equal_payload() {
        let payload = genesis_payload().with_settlement(SettlementReference {
            invoice: "lnbcrt10n1".into(),
            payment_hash: "aa".into(),
            preimage: "bb".into(),
        });
        let bytes = payload.to_canonical_bytes().unwrap();
        assert_eq!(Payload::from_bytes(&bytes).unwrap(), payload);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = Payload::from_bytes(b"Genesis Block").unwrap_err();
        assert!(matches!(err, TypeError::Serialization(_)));
    }
}
