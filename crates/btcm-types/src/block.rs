use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ContentKey;

/// Hex-encoded SHA-256 block digest.
///
/// The one non-digest value a `BlockHash` may hold is the genesis parent
/// sentinel `"0"`, used as the `previous_hash` of block 0.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// Sentinel parent of the genesis block.
    pub const GENESIS_PARENT: &'static str = "0";

    /// The genesis parent sentinel.
    pub fn genesis_parent() -> Self {
        Self(Self::GENESIS_PARENT.to_string())
    }

    /// Build from a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Wrap an arbitrary string without validation.
    ///
    /// Used when reading blocks from untrusted sources; validation happens by
    /// recomputing the hash, not by inspecting its shape.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns `true` for the genesis parent sentinel.
    pub fn is_genesis_parent(&self) -> bool {
        self.0 == Self::GENESIS_PARENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// First 8 hex characters.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.short())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ledger entry.
///
/// The block holds only a reference to its payload; the payload itself lives
/// in the content store. `hash` covers `(index, previous_hash, timestamp,
/// payload_reference)`, so a block can be re-verified without fetching the
/// payload.
///
/// This is also the persisted representation: exactly these five fields, all
/// required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// Position in the chain; genesis is 0.
    pub index: u64,
    /// Hash of the preceding block, or `"0"` for genesis.
    pub previous_hash: BlockHash,
    /// Creation time, seconds since the UNIX epoch.
    pub timestamp: u64,
    /// Content-store key of the externalized payload.
    pub payload_reference: ContentKey,
    /// SHA-256 over the four fields above.
    pub hash: BlockHash,
}

impl Block {
    /// Returns `true` if this block has the shape of a genesis block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_genesis_parent()
    }
}
