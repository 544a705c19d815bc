use std::fs;
use std::path::{Path, PathBuf};

use btcm_settlement::GatewayConfig;
use btcm_types::{Issuance, LedgerPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Who receives the genesis issuance, and how much.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub recipient: String,
    pub reward: u64,
}

impl GenesisConfig {
    pub fn issuance(&self) -> SdkResult<Issuance> {
        Ok(Issuance::new(self.recipient.clone(), self.reward)?)
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            recipient: "first_miner".into(),
            reward: 50,
        }
    }
}

/// Everything needed to stand up a [`Node`](crate::Node).
///
/// Every section is optional in TOML; missing sections take their defaults:
///
/// ```toml
/// store_dir = "/var/lib/btcm"
///
/// [policy]
/// block_size = 2097152
/// difficulty = 120
///
/// [genesis]
/// recipient = "first_miner"
/// reward = 50
///
/// [gateway]
/// endpoint = "localhost:10009"
/// request_timeout = 30
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// When set, blocks and payloads persist under this directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    pub policy: LedgerPolicy,
    pub genesis: GenesisConfig,
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Write this config as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }
}
