//! Reference table decoding
//!
//! Each index has a reference table describing its files. The table is
//! stored as file `index` of index 255, wrapped in an ordinary container.
//!
//! # Table Formats
//!
//! - **V5**: no table version, `u16` counts
//! - **V6**: adds a `u32` table version
//! - **V7**: counts and id deltas become big smarts
//!
//! # Body Layout
//!
//! ```text
//! u8      format
//! u32     version                      (V6+)
//! u8      options
//! count   file count
//! count   file id delta     × files
//! i32     identifier        × files    (identifiers)
//! u32     crc               × files
//! i32     mystery hash      × files    (mystery hashes)
//! [64]    whirlpool         × files    (whirlpool digests)
//! u32 u32 sizes             × files    (sizes)
//! u32     version           × files
//! count   entry count       × files
//! count   entry id delta    × entries
//! i32     entry identifier  × entries  (identifiers)
//! ```
//!
//! File and entry ids are gap encoded: every id after the first is the
//! previous id plus a positive delta.
//!
//! # Example
//!
//! ```rust
//! use runecache_formats::reference_table::{ReferenceTable, TableFormat};
//!
//! // V5 table with one file (id 3, crc 0x0A, version 1, one entry)
//! let body = [
//!     5, 0,       // format, options
//!     0, 1,       // file count
//!     0, 3,       // id delta
//!     0, 0, 0, 0x0A, // crc
//!     0, 0, 0, 1, // version
//!     0, 1,       // entry count
//!     0, 0,       // entry id delta
//! ];
//!
//! let table = ReferenceTable::parse(&body).unwrap();
//! assert_eq!(table.format, TableFormat::V5);
//! assert_eq!(table.file_ids().collect::<Vec<_>>(), vec![3]);
//! assert_eq!(table.file(3).unwrap().crc, Some(0x0A));
//! ```

mod file_metadata;
mod options;
mod reader;

pub use file_metadata::{EntryInfo, FileMetadata, TIMESTAMP_THRESHOLD, version_timestamp};
pub use options::TableOptions;

use std::collections::BTreeMap;
use std::fmt;

use runecache_crypto::{WhirlpoolDigest, XteaKey};

use crate::container::decode_container;
use crate::error::{DecodeError, DecodeResult};
use reader::{FieldLayout, TableReader, accumulate_ids};

/// Reference table format revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableFormat {
    /// Unversioned table with `u16` counts
    V5 = 5,
    /// Versioned table with `u16` counts
    V6 = 6,
    /// Versioned table with big smart counts
    V7 = 7,
}

impl TableFormat {
    /// Parse the format byte
    pub fn from_byte(byte: u8) -> DecodeResult<Self> {
        match byte {
            5 => Ok(Self::V5),
            6 => Ok(Self::V6),
            7 => Ok(Self::V7),
            other => Err(DecodeError::MalformedTable(format!(
                "unknown table format {other}"
            ))),
        }
    }

    /// Get the format byte
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the table carries a version
    pub const fn has_version(self) -> bool {
        !matches!(self, Self::V5)
    }

    /// Whether counts and deltas are big smarts
    pub const fn uses_smart_counts(self) -> bool {
        matches!(self, Self::V7)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte())
    }
}

/// Decoded reference table of one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    /// Format revision
    pub format: TableFormat,
    /// Table version (V6+)
    pub version: Option<u32>,
    /// Column flags
    pub options: TableOptions,
    /// File metadata keyed by file id
    pub files: BTreeMap<u32, FileMetadata>,
}

impl ReferenceTable {
    /// Parse a decompressed table body
    pub fn parse(body: &[u8]) -> DecodeResult<Self> {
        let mut reader = TableReader::new(body);

        let format = TableFormat::from_byte(reader.u8()?)?;
        let version = if format.has_version() {
            Some(reader.u32()?)
        } else {
            None
        };
        let options = TableOptions::new(reader.u8()?);
        let layout = FieldLayout::new(format, options);

        let file_count = reader.count(&layout)? as usize;
        let ids = accumulate_ids(&reader.counts(file_count, &layout)?, "file")?;
        let mut records = vec![FileMetadata::default(); file_count];

        if layout.identifiers {
            for record in &mut records {
                record.identifier = Some(reader.i32()?);
            }
        }

        for record in &mut records {
            record.crc = Some(reader.u32()?);
        }

        if layout.mystery_hashes {
            for record in &mut records {
                record.mystery_hash = Some(reader.i32()?);
            }
        }

        if layout.whirlpool_digests {
            for record in &mut records {
                record.whirlpool = Some(WhirlpoolDigest::from_bytes(reader.bytes()?));
            }
        }

        if layout.sizes {
            for record in &mut records {
                record.compressed_size = Some(reader.u32()?);
                record.uncompressed_size = Some(reader.u32()?);
            }
        }

        for record in &mut records {
            record.version = Some(reader.u32()?);
        }

        let entry_counts = reader.counts(file_count, &layout)?;
        let total_entries = entry_counts
            .iter()
            .try_fold(0usize, |total, &count| total.checked_add(count as usize))
            .ok_or_else(|| DecodeError::MalformedTable("entry count overflows".to_string()))?;
        reader.ensure_fits(total_entries, FieldLayout::MIN_COUNT_WIDTH, "entry ids")?;

        let mut entry_ids = Vec::with_capacity(file_count);
        for &count in &entry_counts {
            let deltas = reader.counts(count as usize, &layout)?;
            entry_ids.push(accumulate_ids(&deltas, "entry")?);
        }

        let mut entry_identifiers = Vec::with_capacity(file_count);
        for ids in &entry_ids {
            if layout.identifiers {
                let identifiers = ids
                    .iter()
                    .map(|_| reader.i32().map(Some))
                    .collect::<DecodeResult<Vec<_>>>()?;
                entry_identifiers.push(identifiers);
            } else {
                entry_identifiers.push(vec![None; ids.len()]);
            }
        }

        if reader.remaining() != 0 {
            return Err(DecodeError::MalformedTable(format!(
                "{} unread bytes after last field",
                reader.remaining()
            )));
        }

        for ((record, ids), identifiers) in records.iter_mut().zip(entry_ids).zip(entry_identifiers)
        {
            record.entries = Some(
                ids.into_iter()
                    .zip(identifiers)
                    .map(|(id, identifier)| (id, EntryInfo { identifier }))
                    .collect(),
            );
        }

        Ok(Self {
            format,
            version,
            options,
            files: ids.into_iter().zip(records).collect(),
        })
    }

    /// Table version as Unix seconds, see [`TIMESTAMP_THRESHOLD`]
    pub fn version_timestamp(&self) -> Option<i64> {
        version_timestamp(self.version)
    }

    /// File ids in ascending order
    pub fn file_ids(&self) -> impl DoubleEndedIterator<Item = u32> + ExactSizeIterator + '_ {
        self.files.keys().copied()
    }

    /// Metadata for `file`
    pub fn file(&self, file: u32) -> Option<&FileMetadata> {
        self.files.get(&file)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the table lists no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Decode a reference table from its raw container bytes.
///
/// The container is self-describing; `key` decrypts it when present.
pub fn decode_reference_table(raw: &[u8], key: Option<&XteaKey>) -> DecodeResult<ReferenceTable> {
    let container = decode_container(raw, key)?;
    ReferenceTable::parse(&container.data)
}
