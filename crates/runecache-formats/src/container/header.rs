//! Container header parsing
//!
//! ```text
//! offset 0   u8   compression tag
//! offset 1   u32  compressed length (payload bytes)
//! offset 5   u32  decompressed length, only when compressed
//! ```
//!
//! The first five bytes are never encrypted. The decompressed length field
//! is covered by encryption together with the payload, so it is read from
//! the (possibly decrypted) body rather than here.

use binrw::BinReaderExt;
use std::io::Cursor;

use crate::compression::CompressionType;
use crate::error::{DecodeError, DecodeResult};

/// Size of the plaintext prefix (tag + compressed length)
pub const PREFIX_SIZE: usize = 5;

/// Size of the decompressed length field present on compressed containers
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Size of the optional trailing version stamp
pub const VERSION_STAMP_SIZE: usize = 2;

/// Plaintext container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Compression codec
    pub compression: CompressionType,
    /// Declared payload length in bytes
    pub compressed_size: u32,
}

impl ContainerHeader {
    /// Read the header from the start of `data`
    pub fn read(data: &[u8]) -> DecodeResult<Self> {
        if data.len() < PREFIX_SIZE {
            return Err(DecodeError::TruncatedData(format!(
                "container header needs {PREFIX_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let mut reader = Cursor::new(data);
        let tag: u8 = reader.read_be()?;
        let compression = CompressionType::try_from_byte(tag)?;
        let compressed_size: u32 = reader.read_be()?;

        Ok(Self {
            compression,
            compressed_size,
        })
    }

    /// Length of the body following the prefix: the decompressed length
    /// field (if any) plus the payload. This is the span covered by
    /// encryption.
    pub fn body_size(&self) -> usize {
        let length_field = if self.compression.is_compressed() {
            LENGTH_FIELD_SIZE
        } else {
            0
        };
        self.compressed_size as usize + length_field
    }

    /// Total container length excluding any version stamp
    pub fn container_size(&self) -> usize {
        PREFIX_SIZE + self.body_size()
    }

    /// Slice the container bytes (prefix and body, no stamp) out of `data`
    pub fn container_bytes<'a>(&self, data: &'a [u8]) -> DecodeResult<&'a [u8]> {
        let size = self.container_size();
        data.get(..size).ok_or_else(|| {
            DecodeError::TruncatedData(format!(
                "container declares {size} bytes, only {} available",
                data.len()
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uncompressed_header() {
        let header = ContainerHeader::read(&[0, 0, 0, 0, 3, b'a', b'b', b'c']).unwrap();
        assert_eq!(header.compression, CompressionType::None);
        assert_eq!(header.compressed_size, 3);
        assert_eq!(header.body_size(), 3);
        assert_eq!(header.container_size(), 8);
    }

    #[test]
    fn test_read_compressed_header() {
        let header = ContainerHeader::read(&[2, 0, 0, 1, 0]).unwrap();
        assert_eq!(header.compression, CompressionType::Gzip);
        assert_eq!(header.compressed_size, 256);
        assert_eq!(header.body_size(), 260);
        assert!(header.container_bytes(&[2, 0, 0, 1, 0]).is_err());
    }

    #[test]
    fn test_short_header() {
        assert!(matches!(
            ContainerHeader::read(&[0, 0, 0]),
            Err(DecodeError::TruncatedData(_))
        ));
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            ContainerHeader::read(&[7, 0, 0, 0, 0]),
            Err(DecodeError::UnsupportedCompression(7))
        ));
    }
}
