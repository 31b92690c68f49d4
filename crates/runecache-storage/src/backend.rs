//! Storage backend trait and the in-memory backend

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use runecache_formats::REFERENCE_TABLE_INDEX;

use crate::{Result, StorageError};

/// Source of raw container bytes
///
/// Implementations only move bytes; decoding happens in [`Cache`](crate::Cache).
pub trait CacheStorage: Send + Sync {
    /// Raw container of file `file` in index `index`
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>>;

    /// Raw reference table container of `index`
    fn read_index_bytes(&self, index: u8) -> Result<Vec<u8>> {
        self.read_file_bytes(REFERENCE_TABLE_INDEX, u32::from(index))
    }

    /// Ids of the indexes present, excluding the reference table index
    fn indexes(&self) -> Result<Vec<u8>>;
}

impl<T: CacheStorage + ?Sized> CacheStorage for Arc<T> {
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>> {
        (**self).read_file_bytes(index, file)
    }

    fn read_index_bytes(&self, index: u8) -> Result<Vec<u8>> {
        (**self).read_index_bytes(index)
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        (**self).indexes()
    }
}

impl<T: CacheStorage + ?Sized> CacheStorage for Box<T> {
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>> {
        (**self).read_file_bytes(index, file)
    }

    fn read_index_bytes(&self, index: u8) -> Result<Vec<u8>> {
        (**self).read_index_bytes(index)
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        (**self).indexes()
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<(u8, u32), Arc<[u8]>>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw container bytes for `(index, file)`, replacing any previous
    pub fn insert(&self, index: u8, file: u32, data: impl Into<Arc<[u8]>>) {
        self.files.write().insert((index, file), data.into());
    }

    /// Store the raw reference table container of `index`
    pub fn insert_index(&self, index: u8, data: impl Into<Arc<[u8]>>) {
        self.insert(REFERENCE_TABLE_INDEX, u32::from(index), data);
    }

    /// Remove a file
    pub fn remove(&self, index: u8, file: u32) -> bool {
        self.files.write().remove(&(index, file)).is_some()
    }

    /// Number of stored containers
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl CacheStorage for MemoryStorage {
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(&(index, file))
            .map(|data| data.to_vec())
            .ok_or(StorageError::NotFound { index, file })
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        let indexes: BTreeSet<u8> = self
            .files
            .read()
            .keys()
            .map(|&(index, _)| index)
            .filter(|&index| index != REFERENCE_TABLE_INDEX)
            .collect();
        Ok(indexes.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.insert(2, 10, vec![1, 2, 3]);
        storage.insert_index(2, vec![9]);
        storage.insert(7, 0, vec![4]);

        assert_eq!(storage.len(), 3);
        assert_eq!(storage.read_file_bytes(2, 10).unwrap(), vec![1, 2, 3]);
        assert_eq!(storage.read_index_bytes(2).unwrap(), vec![9]);
        assert_eq!(storage.indexes().unwrap(), vec![2, 7]);

        assert!(matches!(
            storage.read_file_bytes(2, 11),
            Err(StorageError::NotFound { index: 2, file: 11 })
        ));

        assert!(storage.remove(7, 0));
        assert_eq!(storage.indexes().unwrap(), vec![2]);
    }

    #[test]
    fn test_shared_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(1, 1, vec![5]);

        let shared: Box<dyn CacheStorage> = Box::new(Arc::clone(&storage));
        assert_eq!(shared.read_file_bytes(1, 1).unwrap(), vec![5]);
    }
}
