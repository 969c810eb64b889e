use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pairswap_core::serialize;

use super::overlay::Overlay;
use super::Storage;
use crate::error::StateError;

/// File-backed storage using a single snapshot file.
///
/// Every commit rewrites the file through a temporary file and a rename, so
/// a crash leaves either the old or the new snapshot on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    inner: Overlay,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, StateError> {
        let path = path.into();
        let committed: BTreeMap<Vec<u8>, Vec<u8>> = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| StateError::Storage(e.to_string()))?;
            if bytes.is_empty() {
                BTreeMap::new()
            } else {
                serialize::from_bytes(&bytes)
                    .map_err(|e| StateError::Serialization(e.to_string()))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(FileStorage {
            path,
            inner: Overlay::with_committed(committed),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when nothing has been committed yet
    pub fn is_empty(&self) -> bool {
        self.inner.committed.is_empty()
    }

    fn flush_to_disk(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::Storage(e.to_string()))?;
        }

        let bytes = serialize::to_bytes(&self.inner.committed)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).map_err(|e| StateError::Storage(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StateError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.inner.stage(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.inner.stage(key, None);
    }

    fn commit(&mut self) -> Result<(), StateError> {
        self.inner.apply_pending();
        self.flush_to_disk()
    }

    fn rollback(&mut self) {
        self.inner.discard_pending();
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.inner.keys_with_prefix(prefix)
    }
}
