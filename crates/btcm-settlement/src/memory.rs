use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use btcm_crypto::sha256;
use btcm_types::unix_now;
use rand::RngCore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{SettlementError, SettlementResult};
use crate::traits::SettlementGateway;
use crate::types::{Invoice, InvoiceToken, PaymentProof};

struct Entry {
    invoice: Invoice,
    preimage: [u8; 32],
    settled: bool,
}

/// Self-contained settlement gateway for tests, demos and embedding.
///
/// Invoices get a fresh random 32-byte preimage; the payment hash is its
/// SHA-256. Settling reveals the preimage exactly once.
pub struct InMemoryGateway {
    config: GatewayConfig,
    invoices: Mutex<HashMap<InvoiceToken, Entry>>,
    available: AtomicBool,
}

impl InMemoryGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            invoices: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Simulate the node going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of invoices issued so far.
    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().map(|m| m.len()).unwrap_or_default()
    }

    fn connect(&self) -> SettlementResult<MutexGuard<'_, HashMap<InvoiceToken, Entry>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SettlementError::Unavailable(format!(
                "connection refused: {}",
                self.config.endpoint
            )));
        }
        self.invoices
            .lock()
            .map_err(|_| SettlementError::Unavailable("gateway state poisoned".into()))
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("endpoint", &self.config.endpoint)
            .field("invoices", &self.invoice_count())
            .finish()
    }
}

#[async_trait]
impl SettlementGateway for InMemoryGateway {
    async fn create_invoice(&self, amount: u64, memo: &str) -> SettlementResult<Invoice> {
        if amount == 0 || amount > self.config.max_invoice_amount {
            return Err(SettlementError::InvalidAmount(amount));
        }

        let mut invoices = self.connect()?;

        let mut preimage = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut preimage);
        let id = Uuid::now_v7().simple().to_string();

        let invoice = Invoice {
            token: InvoiceToken::new(format!("lnbcrt{amount}n1{id}")),
            amount,
            memo: memo.to_owned(),
            payment_hash: hex::encode(sha256(&preimage)),
            expires_at: unix_now().saturating_add(self.config.invoice_expiry),
        };

        debug!(token = %invoice.token, amount, "created invoice");
        invoices.insert(
            invoice.token.clone(),
            Entry {
                invoice: invoice.clone(),
                preimage,
                settled: false,
            },
        );
        Ok(invoice)
    }

    async fn settle(&self, token: &InvoiceToken) -> SettlementResult<PaymentProof> {
        let mut invoices = self.connect()?;
        let entry = invoices
            .get_mut(token)
            .ok_or(SettlementError::InvoiceUnknown)?;

        if entry.settled {
            return Err(SettlementError::AlreadySettled);
        }
        if entry.invoice.is_expired_at(unix_now()) {
            warn!(token = %token, "settle attempted on expired invoice");
            return Err(SettlementError::InvoiceExpired);
        }

        entry.settled = true;
        info!(token = %token, amount = entry.invoice.amount, "settled invoice");
        Ok(PaymentProof {
            payment_hash: entry.invoice.payment_hash.clone(),
            preimage: hex::encode(entry.preimage),
        })
    }
}
