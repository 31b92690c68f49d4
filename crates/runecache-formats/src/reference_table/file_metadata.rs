//! Per-file metadata records

use std::collections::BTreeMap;

use runecache_crypto::{WhirlpoolDigest, XteaKey};

use crate::compression::CompressionType;

/// Versions above this value (2000-01-01T00:00:00Z) are publish times
pub const TIMESTAMP_THRESHOLD: u32 = 946_684_800;

/// Interpret a version as Unix seconds when it is plausibly a timestamp
pub fn version_timestamp(version: Option<u32>) -> Option<i64> {
    version
        .filter(|&v| v > TIMESTAMP_THRESHOLD)
        .map(i64::from)
}

/// Metadata recorded for one entry of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryInfo {
    /// Name hash, when the table carries identifiers
    pub identifier: Option<i32>,
}

/// Metadata for one file
///
/// Records built by the reference table decoder never know the compression
/// type or encryption key; [`decode_file`](crate::container::decode_file)
/// fills in the former, the key comes from a key store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileMetadata {
    /// Compression codec of the container
    pub compression: Option<CompressionType>,
    /// Container payload length, recorded only by tables with the sizes
    /// option
    pub compressed_size: Option<u32>,
    /// Payload length after decompression
    pub uncompressed_size: Option<u32>,
    /// File version
    pub version: Option<u32>,
    /// CRC32 of the container bytes
    pub crc: Option<u32>,
    /// Unidentified per-file hash, kept as stored
    pub mystery_hash: Option<i32>,
    /// Whirlpool digest of the container bytes
    pub whirlpool: Option<WhirlpoolDigest>,
    /// Name hash of the file
    pub identifier: Option<i32>,
    /// XTEA key used to decrypt the container
    pub encryption_key: Option<XteaKey>,
    /// Entry layout, keyed by entry id
    pub entries: Option<BTreeMap<u32, EntryInfo>>,
}

impl FileMetadata {
    /// Version as Unix seconds, see [`TIMESTAMP_THRESHOLD`]
    pub fn version_timestamp(&self) -> Option<i64> {
        version_timestamp(self.version)
    }

    /// Whether the file declares an entry layout
    pub fn has_entries(&self) -> bool {
        self.entries.is_some()
    }

    /// Entry ids in ascending order
    pub fn entry_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().flat_map(BTreeMap::keys).copied()
    }

    /// Copy of this record carrying `key`
    pub fn with_encryption_key(mut self, key: Option<XteaKey>) -> Self {
        self.encryption_key = key;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_timestamp_threshold() {
        assert_eq!(version_timestamp(None), None);
        assert_eq!(version_timestamp(Some(12)), None);
        assert_eq!(version_timestamp(Some(TIMESTAMP_THRESHOLD)), None);
        assert_eq!(
            version_timestamp(Some(TIMESTAMP_THRESHOLD + 1)),
            Some(946_684_801)
        );
    }

    #[test]
    fn test_entry_ids() {
        let metadata = FileMetadata {
            entries: Some(BTreeMap::from([
                (9, EntryInfo::default()),
                (1, EntryInfo { identifier: Some(-5) }),
            ])),
            ..FileMetadata::default()
        };
        assert!(metadata.has_entries());
        assert_eq!(metadata.entry_ids().collect::<Vec<_>>(), vec![1, 9]);
        assert_eq!(FileMetadata::default().entry_ids().count(), 0);
    }
}
