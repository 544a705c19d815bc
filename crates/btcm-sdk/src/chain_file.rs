use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use btcm_types::Block;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// The persisted block list: a JSON array of five-field block records.
#[derive(Clone, Debug)]
pub struct ChainFile {
    path: PathBuf,
}

impl ChainFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read all blocks, genesis first. A missing file is `NotInitialized`.
    pub fn load(&self) -> SdkResult<Vec<Block>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SdkError::NotInitialized(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| SdkError::ChainFile(e.to_string()))
    }

    /// Replace the file contents with `blocks`, atomically.
    pub fn save(&self, blocks: &[Block]) -> SdkResult<()> {
        let json =
            serde_json::to_vec_pretty(blocks).map_err(|e| SdkError::ChainFile(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| SdkError::Io(e.error))?;
        debug!(path = %self.path.display(), blocks = blocks.len(), "saved chain file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btcm_types::{BlockHash, ContentKey};

    fn block(index: u64) -> Block {
        Block {
            index,
            previous_hash: BlockHash::genesis_parent(),
            timestamp: 1_700_000_000,
            payload_reference: ContentKey::new("ref"),
            hash: BlockHash::from_digest([index as u8; 32]),
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = ChainFile::new(dir.path().join("chain.json"));
        assert!(!file.exists());
        file.save(&[block(0), block(1)]).unwrap();
        assert!(file.exists());
        assert_eq!(file.load().unwrap(), vec![block(0), block(1)]);
    }

    #[test]
    fn missing_file_is_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChainFile::new(dir.path().join("chain.json")).load().unwrap_err();
        assert!(matches!(err, SdkError::NotInitialized(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        fs::write(
            &path,
            r#"[{"index":0,"previous_hash":"0","timestamp":1,"payload_reference":"r","hash":"h","extra":1}]"#,
        )
        .unwrap();
        let err = ChainFile::new(path).load().unwrap_err();
        assert!(matches!(err, SdkError::ChainFile(_)));
    }
}
