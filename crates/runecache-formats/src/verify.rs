//! Checksum verification against reference table metadata
//!
//! CRC32 and Whirlpool values in a reference table cover the container
//! bytes as stored (header and body, without the version stamp). The
//! decoder never checks them on its own; callers that want integrity checks
//! ask for a [`Verification`] and decide what a mismatch means.

use runecache_crypto::{WhirlpoolDigest, crc32};

use crate::container::ContainerHeader;
use crate::error::DecodeResult;
use crate::reference_table::FileMetadata;

/// Comparison of a recorded value with the computed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check<T> {
    /// Value recorded in the reference table
    pub expected: T,
    /// Value computed from the container bytes
    pub actual: T,
}

impl<T: PartialEq> Check<T> {
    /// Whether both values agree
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// Outcome of verifying one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verification {
    /// CRC32 check, when the metadata records a CRC
    pub crc: Option<Check<u32>>,
    /// Whirlpool check, when the metadata records a digest
    pub whirlpool: Option<Check<WhirlpoolDigest>>,
}

impl Verification {
    /// Whether every performed check matched
    pub fn is_valid(&self) -> bool {
        self.crc.as_ref().is_none_or(Check::matches)
            && self.whirlpool.as_ref().is_none_or(Check::matches)
    }
}

/// Verify `raw` container bytes against `metadata`
///
/// Fails only when the container header itself cannot be read.
pub fn verify_file(raw: &[u8], metadata: &FileMetadata) -> DecodeResult<Verification> {
    let header = ContainerHeader::read(raw)?;
    let container = header.container_bytes(raw)?;

    Ok(Verification {
        crc: metadata.crc.map(|expected| Check {
            expected,
            actual: crc32(container),
        }),
        whirlpool: metadata.whirlpool.map(|expected| Check {
            expected,
            actual: WhirlpoolDigest::from_data(container),
        }),
    })
}
