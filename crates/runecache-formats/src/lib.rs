//! Decoders for JS5 asset cache containers and reference tables
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Many cache-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A cache is split into numbered indexes holding numbered files. Every file
//! is stored as a container (compression tag, lengths, payload, optional
//! version stamp), and every index is described by a reference table that is
//! itself a container stored in index 255.
//!
//! # Supported Formats
//!
//! - **Containers**: uncompressed, bzip2, gzip and LZMA payloads, optionally
//!   XTEA encrypted, with an optional trailing version stamp
//! - **Entries**: multi-entry files split into contiguous per-entry ranges
//! - **Reference Tables**: formats 5, 6 and 7 with every option column
//!
//! # Design Principles
//!
//! - **Pure decoding**: no I/O, no logging, no shared state; every call owns
//!   its result
//! - **Strict validation**: declared lengths are checked, never trusted
//! - **Typed failures**: every rejection is a [`DecodeError`] variant
//!
//! # Example
//!
//! ```rust
//! use runecache_formats::{decode_file, decode_reference_table};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Uncompressed V6 table with no files
//! let table_bytes = [0, 0, 0, 0, 8, 6, 0, 0, 0, 1, 0, 0, 0];
//! let table = decode_reference_table(&table_bytes, None)?;
//! assert!(table.is_empty());
//! assert_eq!(table.version, Some(1));
//!
//! // A file decoded with metadata from its table
//! let file_bytes = [0, 0, 0, 0, 3, b'a', b'b', b'c'];
//! let file = decode_file(&file_bytes, &Default::default())?;
//! assert_eq!(file.data, b"abc");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Compression codecs used by containers
pub mod compression;
/// File container decoding and entry splitting
pub mod container;
pub mod error;
pub mod index;
/// Reference table decoding
pub mod reference_table;
pub mod verify;

pub use compression::{CompressionType, decompress};
pub use container::{Container, DecodedFile, decode_container, decode_file};
pub use error::{DecodeError, DecodeResult};
pub use index::{CacheIndex, REFERENCE_TABLE_INDEX};
pub use reference_table::{
    EntryInfo, FileMetadata, ReferenceTable, TableFormat, TableOptions, decode_reference_table,
};
pub use verify::{Check, Verification, verify_file};
