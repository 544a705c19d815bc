use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use btcm_ledger::{ChainReader, ChainSnapshot, ChainValidator, Ledger, ValidationReport};
use btcm_settlement::{
    InMemoryGateway, Invoice, PaymentProof, SettlementError, SettlementGateway, SettlementResult,
};
use btcm_store::{ContentStore, FsContentStore, InMemoryContentStore};
use btcm_types::{Block, Payload, SettlementReference, Transaction, Transfer};
use tracing::{debug, info, warn};

use crate::chain_file::ChainFile;
use crate::config::NodeConfig;
use crate::error::{SdkError, SdkResult};

/// Payload objects, under the node directory.
pub const OBJECTS_DIR: &str = "objects";
/// Persisted block list, under the node directory.
pub const CHAIN_FILE: &str = "chain.json";
/// Config snapshot written by `init_dir`, under the node directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Appends lost to a concurrent writer are retried this many times in total.
const MAX_SUBMIT_ATTEMPTS: usize = 16;

/// A BTC-Mobile node: one ledger, one settlement gateway, one config.
///
/// All collaborators are passed in explicitly; nothing is global.
pub struct Node {
    ledger: Arc<Ledger>,
    gateway: Arc<dyn SettlementGateway>,
    config: NodeConfig,
    chain_file: Option<ChainFile>,
    persist_lock: Mutex<()>,
}

impl Node {
    /// Build a ledger on `store` and create its genesis block from
    /// `config.genesis`.
    pub fn new(
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn SettlementGateway>,
        config: NodeConfig,
    ) -> SdkResult<Self> {
        let ledger = Ledger::open(store, config.policy, config.genesis.issuance()?)?;
        Ok(Self::with_ledger(Arc::new(ledger), gateway, config))
    }

    /// Wrap an existing ledger (for example one rebuilt with
    /// [`Ledger::restore`]).
    pub fn with_ledger(
        ledger: Arc<Ledger>,
        gateway: Arc<dyn SettlementGateway>,
        config: NodeConfig,
    ) -> Self {
        Self {
            ledger,
            gateway,
            config,
            chain_file: None,
            persist_lock: Mutex::new(()),
        }
    }

    /// Fully in-memory node.
    pub fn in_memory(config: NodeConfig) -> SdkResult<Self> {
        let gateway = Arc::new(InMemoryGateway::new(config.gateway.clone()));
        Self::new(Arc::new(InMemoryContentStore::new()), gateway, config)
    }

    /// Create a new node directory: payload objects, chain file and a config
    /// snapshot. Fails if the directory already holds a chain.
    pub fn init_dir(dir: impl AsRef<Path>, config: NodeConfig) -> SdkResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let chain_file = ChainFile::new(dir.join(CHAIN_FILE));
        if chain_file.exists() {
            return Err(SdkError::AlreadyInitialized(dir.to_path_buf()));
        }

        let store = FsContentStore::open(dir.join(OBJECTS_DIR))?;
        let gateway = Arc::new(InMemoryGateway::new(config.gateway.clone()));
        config.save(dir.join(CONFIG_FILE))?;

        let mut node = Self::new(Arc::new(store), gateway, config)?;
        node.chain_file = Some(chain_file);
        node.persist()?;
        info!(dir = %dir.display(), "initialized node directory");
        Ok(node)
    }

    /// Reopen a directory created by [`Node::init_dir`]. The persisted chain
    /// is verified before use and the ledger policy comes from its genesis
    /// payload, whatever `config.toml` says.
    pub fn open_dir(dir: impl AsRef<Path>) -> SdkResult<Self> {
        let dir = dir.as_ref();
        let chain_file = ChainFile::new(dir.join(CHAIN_FILE));
        let blocks = chain_file.load()?;

        let config_path = dir.join(CONFIG_FILE);
        let mut config = if config_path.is_file() {
            NodeConfig::load(&config_path)?
        } else {
            NodeConfig::default()
        };

        let store = FsContentStore::open(dir.join(OBJECTS_DIR))?;
        let ledger = Ledger::resume(Arc::new(store), blocks)?;
        config.policy = ledger.policy();
        let gateway = Arc::new(InMemoryGateway::new(config.gateway.clone()));

        let mut node = Self::with_ledger(Arc::new(ledger), gateway, config);
        node.chain_file = Some(chain_file);
        debug!(dir = %dir.display(), "opened node directory");
        Ok(node)
    }

    /// Audit a node directory without opening it.
    ///
    /// Unlike [`Node::open_dir`], a broken chain is not an error: every
    /// violation is listed in the report.
    pub fn audit_dir(dir: impl AsRef<Path>) -> SdkResult<ValidationReport> {
        let dir = dir.as_ref();
        let blocks = ChainFile::new(dir.join(CHAIN_FILE)).load()?;
        let store = FsContentStore::open(dir.join(OBJECTS_DIR))?;
        let snapshot = ChainSnapshot::new(blocks, Arc::new(store));
        Ok(ChainValidator::validate_with_payloads(&snapshot)?)
    }

    /// Directory-backed when `config.store_dir` is set (opening it if it
    /// already holds a chain), in-memory otherwise.
    pub fn from_config(config: NodeConfig) -> SdkResult<Self> {
        match config.store_dir.clone() {
            Some(dir) if dir.join(CHAIN_FILE).is_file() => Self::open_dir(dir),
            Some(dir) => Self::init_dir(dir, config),
            None => Self::in_memory(config),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn gateway(&self) -> &Arc<dyn SettlementGateway> {
        &self.gateway
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn blocks(&self) -> SdkResult<Vec<Block>> {
        Ok(self.ledger.blocks()?)
    }

    pub fn payload(&self, block: &Block) -> SdkResult<Payload> {
        Ok(self.ledger.retrieve_payload(block)?)
    }

    /// Audit the whole chain, payloads included.
    pub fn verify(&self) -> SdkResult<ValidationReport> {
        Ok(self.ledger.validate_chain(true)?)
    }

    /// Record an on-chain transfer.
    pub fn transfer(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> SdkResult<Block> {
        let transfer = Transfer::new(sender, recipient, amount)?;
        self.record(&self.ledger.payload_for(vec![transfer.into()]))
    }

    /// Pay `amount` off-chain. Nothing is written to the ledger.
    pub async fn pay_off_chain(&self, amount: u64, memo: &str) -> SdkResult<PaymentProof> {
        let (_, proof) = self.settle_invoice(amount, memo).await?;
        Ok(proof)
    }

    /// Settle off-chain, then record the transfer on chain together with the
    /// settlement evidence. If settlement fails the chain is untouched; if
    /// recording fails the proof comes back in [`SdkError::Unrecorded`].
    pub async fn settle_and_record(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
        memo: &str,
    ) -> SdkResult<Block> {
        let transfer = Transfer::new(sender, recipient, amount)?;
        let (invoice, proof) = self.settle_invoice(amount, memo).await?;

        let payload = self
            .ledger
            .payload_for(vec![Transaction::Transfer(transfer)])
            .with_settlement(SettlementReference {
                invoice: invoice.token.to_string(),
                payment_hash: proof.payment_hash.clone(),
                preimage: proof.preimage.clone(),
            });
        let block = self.record(&payload).map_err(|e| {
            warn!(invoice = %invoice.token, error = %e, "settled payment not recorded");
            SdkError::Unrecorded {
                invoice: invoice.token.to_string(),
                proof,
                source: Box::new(e),
            }
        })?;
        info!(index = block.index, invoice = %invoice.token, "recorded settled payment");
        Ok(block)
    }

    async fn settle_invoice(&self, amount: u64, memo: &str) -> SdkResult<(Invoice, PaymentProof)> {
        let invoice = self
            .bounded("create_invoice", self.gateway.create_invoice(amount, memo))
            .await?;
        let proof = self
            .bounded("settle", self.gateway.settle(&invoice.token))
            .await?;

        if !proof.pays(&invoice) {
            warn!(invoice = %invoice.token, "gateway returned a proof that does not verify");
            return Err(SdkError::InvalidProof(invoice.token.to_string()));
        }
        Ok((invoice, proof))
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = SettlementResult<T>>,
    ) -> SdkResult<T> {
        let limit = self.config.gateway.request_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(operation, timeout_secs = limit.as_secs(), "gateway call timed out");
                Err(SettlementError::Unavailable(format!(
                    "{operation} timed out after {}s",
                    limit.as_secs()
                ))
                .into())
            }
        }
    }

    fn record(&self, payload: &Payload) -> SdkResult<Block> {
        let mut attempt = 1;
        loop {
            match self.ledger.submit(payload) {
                Ok(block) => {
                    self.persist()?;
                    return Ok(block);
                }
                Err(e) if e.is_rejection() && attempt < MAX_SUBMIT_ATTEMPTS => {
                    debug!(attempt, reason = %e, "append lost a race, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn persist(&self) -> SdkResult<()> {
        let Some(chain_file) = &self.chain_file else {
            return Ok(());
        };
        let _guard = self
            .persist_lock
            .lock()
            .map_err(|_| SdkError::ChainFile("persist lock poisoned".into()))?;
        chain_file.save(&self.ledger.blocks()?)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("ledger", &self.ledger)
            .field("chain_file", &self.chain_file)
            .finish()
    }
}
