//! File container decoding
//!
//! Every file in a cache, including each index's reference table, is stored
//! as a container:
//!
//! ```text
//! [ u8 compression ][ u32 compressed length ][ u32 decompressed length ]?
//! [ payload ... ][ u16 version ]?
//! ```
//!
//! # Decoding pipeline
//!
//! 1. Read the plaintext prefix (compression tag, payload length)
//! 2. Decrypt the body with XTEA when a key is supplied
//! 3. Read the decompressed length (compressed containers only)
//! 4. Strip the optional trailing version stamp
//! 5. Decompress the payload
//! 6. Split the payload into entries when the file declares more than one
//!
//! # Example
//!
//! ```rust
//! use runecache_formats::container::{decode_container, decode_file};
//! use runecache_formats::reference_table::FileMetadata;
//!
//! // Uncompressed container holding "hi" with a version stamp of 7
//! let raw = [0, 0, 0, 0, 2, b'h', b'i', 0, 7];
//!
//! let container = decode_container(&raw, None).unwrap();
//! assert_eq!(container.data, b"hi");
//! assert_eq!(container.version, Some(7));
//!
//! let file = decode_file(&raw, &FileMetadata::default()).unwrap();
//! assert_eq!(file.info.version, Some(7));
//! ```

mod entries;
mod header;

pub use entries::split_entries;
pub use header::{ContainerHeader, LENGTH_FIELD_SIZE, PREFIX_SIZE, VERSION_STAMP_SIZE};

use std::collections::BTreeMap;
use std::ops::Range;

use runecache_crypto::{XteaKey, xtea};

use crate::compression::{self, CompressionType};
use crate::error::{DecodeError, DecodeResult};
use crate::reference_table::FileMetadata;

/// A decoded container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Compression codec used by the container
    pub compression: CompressionType,
    /// Declared payload length
    pub compressed_size: u32,
    /// Declared decompressed length (compressed containers only)
    pub decompressed_size: Option<u32>,
    /// Trailing version stamp, if present
    pub version: Option<u16>,
    /// Decompressed payload
    pub data: Vec<u8>,
}

/// Decode a self-describing container.
///
/// `key` decrypts the body when present; without a key the cipher is never
/// invoked.
pub fn decode_container(raw: &[u8], key: Option<&XteaKey>) -> DecodeResult<Container> {
    let header = ContainerHeader::read(raw)?;
    let container = header.container_bytes(raw)?;

    let mut body = container[PREFIX_SIZE..].to_vec();
    if let Some(key) = key {
        xtea::decrypt_in_place(key, &mut body);
    }

    let (decompressed_size, payload) = if header.compression.is_compressed() {
        let (length, payload) = body.split_at(LENGTH_FIELD_SIZE);
        let length = u32::from_be_bytes([length[0], length[1], length[2], length[3]]);
        (Some(length), payload)
    } else {
        (None, body.as_slice())
    };

    let version = read_version_stamp(&raw[container.len()..])?;

    let data = compression::decompress(
        header.compression,
        payload,
        decompressed_size.map(|size| size as usize),
    )?;

    Ok(Container {
        compression: header.compression,
        compressed_size: header.compressed_size,
        decompressed_size,
        version,
        data,
    })
}

fn read_version_stamp(trailer: &[u8]) -> DecodeResult<Option<u16>> {
    match trailer {
        [] => Ok(None),
        [high, low] => Ok(Some(u16::from_be_bytes([*high, *low]))),
        other => Err(DecodeError::CorruptData(format!(
            "{} unexpected bytes after container payload",
            other.len()
        ))),
    }
}

/// A decoded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    /// Decompressed payload, without the entry trailer of multi-entry files
    pub data: Vec<u8>,
    /// Metadata used to decode the file, completed with in-band values
    /// (compression type, version stamp). Sizes are left as the table
    /// recorded them.
    pub info: FileMetadata,
    /// Byte range of each entry within `data`, present when the metadata
    /// lists entries. Ranges are contiguous and ordered by id.
    pub entries: Option<BTreeMap<u32, Range<usize>>>,
}

impl DecodedFile {
    /// Number of entries (1 for files without an entry layout)
    pub fn entry_count(&self) -> usize {
        self.entries.as_ref().map_or(1, BTreeMap::len)
    }

    /// Bytes of entry `id`
    pub fn entry(&self, id: u32) -> Option<&[u8]> {
        let range = self.entries.as_ref()?.get(&id)?;
        self.data.get(range.clone())
    }

    /// Iterate over `(entry id, bytes)` in id order
    pub fn iter_entries(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        self.entries
            .iter()
            .flatten()
            .filter_map(|(&id, range)| Some((id, self.data.get(range.clone())?)))
    }
}

/// Decode a file using metadata from its index's reference table.
///
/// Sizes known from the metadata must agree with the container header
/// ([`DecodeError::SizeMismatch`] otherwise). A version stamp fills in
/// the version when the metadata has none.
pub fn decode_file(raw: &[u8], metadata: &FileMetadata) -> DecodeResult<DecodedFile> {
    let header = ContainerHeader::read(raw)?;

    if let Some(expected) = metadata.compressed_size
        && expected != header.compressed_size
    {
        return Err(DecodeError::size_mismatch(
            "compressed size",
            expected as usize,
            header.compressed_size as usize,
        ));
    }

    if let Some(expected) = metadata.compression
        && expected != header.compression
    {
        return Err(DecodeError::CorruptData(format!(
            "container is {} compressed, metadata says {expected}",
            header.compression
        )));
    }

    let container = decode_container(raw, metadata.encryption_key.as_ref())?;

    if let Some(expected) = metadata.uncompressed_size
        && expected as usize != container.data.len()
    {
        return Err(DecodeError::size_mismatch(
            "uncompressed size",
            expected as usize,
            container.data.len(),
        ));
    }

    let mut info = metadata.clone();
    info.compression = Some(container.compression);
    if info.version.is_none() {
        info.version = container.version.map(u32::from);
    }

    let (data, entries) = match &metadata.entries {
        Some(layout) => {
            let ids: Vec<u32> = layout.keys().copied().collect();
            let (data, ranges) = split_entries(container.data, &ids)?;
            (data, Some(ranges))
        }
        None => (container.data, None),
    };

    Ok(DecodedFile {
        data,
        info,
        entries,
    })
}
