use serde::{Deserialize, Serialize};

/// Block-size and block-interval settings attached to a ledger.
///
/// Both values are advisory: they are recorded in block payloads but nothing
/// in the ledger enforces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Block size ceiling in bytes.
    #[serde(rename = "block_size")]
    pub max_block_size: u64,
    /// Target seconds between blocks.
    #[serde(rename = "difficulty")]
    pub target_interval: u64,
}

impl LedgerPolicy {
    /// 2 MiB.
    pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 2 * 1024 * 1024;
    /// Two minutes.
    pub const DEFAULT_TARGET_INTERVAL: u64 = 2 * 60;

    pub fn new(max_block_size: u64, target_interval: u64) -> Self {
        Self {
            max_block_size,
            target_interval,
        }
    }
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_BLOCK_SIZE,
            Self::DEFAULT_TARGET_INTERVAL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mobile_profile() {
        let policy = LedgerPolicy::default();
        assert_eq!(policy.max_block_size, 2_097_152);
        assert_eq!(policy.target_interval, 120);
    }

    #[test]
    fn wire_names() {
        let json = serde_json::to_value(LedgerPolicy::new(10, 20)).unwrap();
        assert_eq!(json["block_size"], 10);
        assert_eq!(json["difficulty"], 20);
    }
}
