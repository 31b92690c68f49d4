//! Compression codec dispatch
//!
//! Containers name their codec with a one byte tag. Decompression is a pure
//! function of (tag, payload, declared length):
//!
//! - **None** (0): payload returned as is
//! - **Bzip2** (1): bzip2 stream stored without its `BZh1` magic
//! - **Gzip** (2): complete gzip member
//! - **Lzma** (3): 5 bytes of LZMA properties followed by the raw stream

use crate::error::{DecodeError, DecodeResult};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fmt;
use std::io::{self, Read};

/// Maximum allowed decompression size (256 MiB)
///
/// Declared lengths come from untrusted bytes; this bounds the allocation a
/// hostile header can request.
pub const MAX_DECOMPRESSED_SIZE: usize = 256 * 1024 * 1024;

/// Magic stripped from stored bzip2 payloads
pub const BZIP2_MAGIC: [u8; 4] = *b"BZh1";

/// Length of the LZMA properties block at the start of an LZMA payload
pub const LZMA_PROPERTIES_SIZE: usize = 5;

/// Container compression types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionType {
    /// Stored uncompressed
    None = 0,
    /// Headerless bzip2
    Bzip2 = 1,
    /// Gzip
    Gzip = 2,
    /// LZMA with properties but no size field
    Lzma = 3,
}

impl CompressionType {
    /// Parse compression type from its tag
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::None),
            1 => Some(Self::Bzip2),
            2 => Some(Self::Gzip),
            3 => Some(Self::Lzma),
            _ => None,
        }
    }

    /// Parse compression type, failing with [`DecodeError::UnsupportedCompression`]
    pub fn try_from_byte(byte: u8) -> DecodeResult<Self> {
        Self::from_byte(byte).ok_or(DecodeError::UnsupportedCompression(byte))
    }

    /// Get the tag byte
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the container stores a decompressed length field
    pub const fn is_compressed(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Human readable codec name
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bzip2 => "Bzip2",
            Self::Gzip => "Gzip",
            Self::Lzma => "Lzma",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decompress `data` using `compression`
///
/// When `expected_len` is given the output must have exactly that length,
/// otherwise the call fails with [`DecodeError::SizeMismatch`]. A stream
/// that ends early fails with [`DecodeError::TruncatedData`]; any other
/// stream violation is [`DecodeError::CorruptData`].
pub fn decompress(
    compression: CompressionType,
    data: &[u8],
    expected_len: Option<usize>,
) -> DecodeResult<Vec<u8>> {
    if let Some(expected) = expected_len
        && expected > MAX_DECOMPRESSED_SIZE
    {
        return Err(DecodeError::CorruptData(format!(
            "declared decompressed size {expected} exceeds limit of {MAX_DECOMPRESSED_SIZE} bytes"
        )));
    }

    let decompressed = match compression {
        CompressionType::None => data.to_vec(),
        CompressionType::Bzip2 => {
            let magic: &[u8] = &BZIP2_MAGIC;
            let decoder = BzDecoder::new(magic.chain(data));
            read_bounded(decoder, compression, expected_len)?
        }
        CompressionType::Gzip => read_bounded(GzDecoder::new(data), compression, expected_len)?,
        CompressionType::Lzma => decompress_lzma(data, expected_len)?,
    };

    if let Some(expected) = expected_len
        && decompressed.len() != expected
    {
        return Err(DecodeError::size_mismatch(
            "decompressed size",
            expected,
            decompressed.len(),
        ));
    }

    Ok(decompressed)
}

/// Drain a decoder, reading at most one byte past the permitted length so
/// overlong streams are detected without unbounded allocation.
fn read_bounded<R: Read>(
    decoder: R,
    compression: CompressionType,
    expected_len: Option<usize>,
) -> DecodeResult<Vec<u8>> {
    let limit = expected_len.unwrap_or(MAX_DECOMPRESSED_SIZE);
    let mut decompressed = Vec::with_capacity(limit.min(1024 * 1024));

    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| stream_error(compression, &e))?;

    if expected_len.is_none() && decompressed.len() > MAX_DECOMPRESSED_SIZE {
        return Err(DecodeError::CorruptData(format!(
            "{compression} output exceeds limit of {MAX_DECOMPRESSED_SIZE} bytes"
        )));
    }

    Ok(decompressed)
}

fn decompress_lzma(data: &[u8], expected_len: Option<usize>) -> DecodeResult<Vec<u8>> {
    if data.len() < LZMA_PROPERTIES_SIZE {
        return Err(DecodeError::TruncatedData(format!(
            "LZMA payload of {} bytes is shorter than its properties block",
            data.len()
        )));
    }

    // Rebuild the 13-byte .lzma header: properties, then the unpacked size
    // (all ones means "unknown, read to end marker").
    let unpacked = expected_len.map_or(u64::MAX, |len| len as u64);
    let mut header = [0u8; LZMA_PROPERTIES_SIZE + 8];
    header[..LZMA_PROPERTIES_SIZE].copy_from_slice(&data[..LZMA_PROPERTIES_SIZE]);
    header[LZMA_PROPERTIES_SIZE..].copy_from_slice(&unpacked.to_le_bytes());

    let mut input = header.as_slice().chain(&data[LZMA_PROPERTIES_SIZE..]);
    let mut decompressed = Vec::with_capacity(expected_len.unwrap_or(0).min(1024 * 1024));

    lzma_rs::lzma_decompress(&mut input, &mut decompressed).map_err(|e| match e {
        lzma_rs::error::Error::IoError(io) | lzma_rs::error::Error::HeaderTooShort(io) => {
            stream_error(CompressionType::Lzma, &io)
        }
        other => DecodeError::CorruptData(format!("Lzma stream: {other}")),
    })?;

    Ok(decompressed)
}

fn stream_error(compression: CompressionType, err: &io::Error) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::TruncatedData(format!("{compression} stream ended early: {err}"))
    } else {
        DecodeError::CorruptData(format!("{compression} stream: {err}"))
    }
}
