//! Cache facade combining storage, keys and decoders

use std::sync::Arc;

use dashmap::DashMap;
use runecache_crypto::XteaKeyProvider;
use runecache_formats::{
    CacheIndex, DecodedFile, REFERENCE_TABLE_INDEX, ReferenceTable, Verification, decode_file,
    decode_reference_table, verify_file,
};
use tracing::{debug, trace};

use crate::backend::CacheStorage;
use crate::{Result, StorageError};

/// Reads and decodes files from a [`CacheStorage`]
///
/// Reference tables are decoded once per index and shared when memoisation
/// is enabled (the default). All methods take `&self`; a `Cache` can be
/// shared between threads.
pub struct Cache<S, K = runecache_crypto::NoKeys> {
    storage: S,
    keys: K,
    tables: DashMap<u8, Arc<ReferenceTable>>,
    memoize_tables: bool,
}

impl<S: CacheStorage, K: XteaKeyProvider> Cache<S, K> {
    /// Create a cache over `storage` using `keys` for encrypted files
    pub fn new(storage: S, keys: K) -> Self {
        Self {
            storage,
            keys,
            tables: DashMap::new(),
            memoize_tables: true,
        }
    }

    /// Enable or disable reference table memoisation
    #[must_use]
    pub fn with_memoize_tables(mut self, enable: bool) -> Self {
        self.memoize_tables = enable;
        self
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Ids of the indexes present in storage
    pub fn indexes(&self) -> Result<Vec<u8>> {
        self.storage.indexes()
    }

    /// Decoded reference table of `index`
    pub fn reference_table(&self, index: u8) -> Result<Arc<ReferenceTable>> {
        if let Some(table) = self.tables.get(&index) {
            trace!("Reference table {} served from memory", index);
            return Ok(Arc::clone(table.value()));
        }

        let raw = self.storage.read_index_bytes(index)?;
        let key = self
            .keys
            .lookup_key(REFERENCE_TABLE_INDEX, Some(u32::from(index)));
        let table = Arc::new(decode_reference_table(&raw, key.as_ref())?);
        debug!(
            "Decoded reference table {} (format {}, {} files)",
            index,
            table.format,
            table.len()
        );

        if self.memoize_tables {
            self.tables.insert(index, Arc::clone(&table));
        }
        Ok(table)
    }

    /// Drop memoised reference tables
    pub fn clear(&self) {
        self.tables.clear();
    }

    /// Read and decode `file` of `index`
    ///
    /// Metadata comes from the index's reference table, the key (if any)
    /// from the key provider.
    pub fn file(&self, index: u8, file: u32) -> Result<DecodedFile> {
        let table = self.reference_table(index)?;
        let metadata = table
            .file(file)
            .ok_or(StorageError::NotFound { index, file })?
            .clone()
            .with_encryption_key(self.keys.lookup_key(index, Some(file)));

        let raw = self.storage.read_file_bytes(index, file)?;
        let decoded = decode_file(&raw, &metadata)?;
        debug!(
            "Decoded file {}/{} ({} bytes, {} entries)",
            index,
            file,
            decoded.data.len(),
            decoded.entry_count()
        );
        Ok(decoded)
    }

    /// Check the stored bytes of `file` against its reference table record
    pub fn verify(&self, index: u8, file: u32) -> Result<Verification> {
        let table = self.reference_table(index)?;
        let metadata = table
            .file(file)
            .ok_or(StorageError::NotFound { index, file })?;
        let raw = self.storage.read_file_bytes(index, file)?;
        Ok(verify_file(&raw, metadata)?)
    }

    /// Well-known name of `index`, if any
    pub fn index_name(index: u8) -> Option<&'static str> {
        CacheIndex::from_id(index).map(CacheIndex::name)
    }
}
