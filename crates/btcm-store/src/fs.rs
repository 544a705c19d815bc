use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use btcm_crypto::ContentHasher;
use btcm_types::ContentKey;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// Directory-backed content store.
///
/// Each object lives in its own file, fanned out by the first two hex
/// characters of its key: `<root>/ab/cdef...`. Writes land in a temporary file
/// in the target directory and are renamed into place, so readers never see a
/// partial object. Reads re-hash the file and report corruption; a later `put`
/// of the same bytes replaces a corrupt file.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened filesystem content store");
        Ok(Self { root })
    }

    /// The directory objects are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the object file for `key`, or `None` if the key is not one this
    /// store could have issued.
    fn object_path(&self, key: &ContentKey) -> Option<PathBuf> {
        let k = key.as_str();
        let well_formed = k.len() == 64
            && k.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return None;
        }
        Some(self.root.join(&k[..2]).join(&k[2..]))
    }
}

impl ContentStore for FsContentStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<ContentKey> {
        let key = ContentKey::new(ContentHasher::OBJECT.hash_hex(bytes));
        let Some(path) = self.object_path(&key) else {
            return Err(StoreError::Unavailable(format!(
                "hasher produced malformed key {key}"
            )));
        };

        match fs::read(&path) {
            Ok(existing) if ContentHasher::OBJECT.verify(&existing, key.as_str()) => {
                return Ok(key);
            }
            Ok(_) => warn!(key = %key.short(), "rewriting corrupt object file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(key = %key.short(), len = bytes.len(), "wrote object file");
        Ok(key)
    }

    fn get(&self, key: &ContentKey) -> StoreResult<Vec<u8>> {
        let path = self
            .object_path(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if !ContentHasher::OBJECT.verify(&data, key.as_str()) {
            let computed = ContentHasher::OBJECT.hash_hex(&data);
            warn!(key = %key.short(), computed = %computed, "object file is corrupt");
            return Err(StoreError::HashMismatch {
                key: key.clone(),
                computed,
            });
        }

        Ok(data)
    }

    fn contains(&self, key: &ContentKey) -> StoreResult<bool> {
        Ok(self.object_path(key).is_some_and(|p| p.is_file()))
    }
}
