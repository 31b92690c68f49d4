//! Flat directory backend
//!
//! Each container is a plain file at `<root>/<index>/<file>`. Reference
//! tables live under `<root>/255/<index>`.

use std::io;
use std::path::{Path, PathBuf};

use runecache_formats::REFERENCE_TABLE_INDEX;
use tracing::{debug, info};

use crate::backend::CacheStorage;
use crate::{Result, StorageError};

/// Directory tree of raw containers
#[derive(Debug, Clone)]
pub struct FlatStorage {
    root: PathBuf,
}

impl FlatStorage {
    /// Open a flat cache rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns error if `root` is not a directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(StorageError::Config(format!(
                "flat cache root {} is not a directory",
                root.display()
            )));
        }

        info!("Opened flat cache at {}", root.display());
        Ok(Self { root })
    }

    /// Cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the container for `(index, file)`
    pub fn file_path(&self, index: u8, file: u32) -> PathBuf {
        self.root.join(index.to_string()).join(file.to_string())
    }
}

impl CacheStorage for FlatStorage {
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>> {
        let path = self.file_path(index, file);
        debug!("Reading {}", path.display());

        std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound { index, file },
            _ => StorageError::Io(e),
        })
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        let mut indexes = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            if let Some(index) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u8>().ok())
                && index != REFERENCE_TABLE_INDEX
            {
                indexes.push(index);
            }
        }

        indexes.sort_unstable();
        debug!("Found {} indexes in {}", indexes.len(), self.root.display());
        Ok(indexes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();

        std::fs::create_dir_all(root.join("255")).unwrap();
        std::fs::create_dir_all(root.join("12")).unwrap();
        std::fs::create_dir_all(root.join("3")).unwrap();
        std::fs::create_dir_all(root.join("not-an-index")).unwrap();
        std::fs::write(root.join("255/12"), [1, 2]).unwrap();
        std::fs::write(root.join("12/40"), [3]).unwrap();

        let storage = FlatStorage::open(root).unwrap();
        assert_eq!(storage.indexes().unwrap(), vec![3, 12]);
        assert_eq!(storage.read_index_bytes(12).unwrap(), vec![1, 2]);
        assert_eq!(storage.read_file_bytes(12, 40).unwrap(), vec![3]);
        assert!(matches!(
            storage.read_file_bytes(12, 41),
            Err(StorageError::NotFound { index: 12, file: 41 })
        ));
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            FlatStorage::open("/nonexistent/cache/root"),
            Err(StorageError::Config(_))
        ));
    }
}
