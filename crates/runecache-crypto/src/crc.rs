//! CRC32 checksums over raw container bytes
//!
//! Reference tables record the standard (IEEE, reflected) CRC32 of each
//! file's container bytes, taken before decryption and decompression and
//! without the trailing version stamp.

/// Compute the CRC32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }
}
