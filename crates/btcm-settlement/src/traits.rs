use async_trait::async_trait;

use crate::error::SettlementResult;
use crate::types::{Invoice, InvoiceToken, PaymentProof};

/// Interface to an off-chain payment network node.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Request a payable invoice for `amount` with a free-form memo.
    async fn create_invoice(&self, amount: u64, memo: &str) -> SettlementResult<Invoice>;

    /// Pay the invoice behind `token` and return the proof of payment.
    async fn settle(&self, token: &InvoiceToken) -> SettlementResult<PaymentProof>;
}
