//! Whirlpool digests for container integrity checks

use digest::Digest;
use std::fmt;
use whirlpool::Whirlpool;

/// Size of a Whirlpool digest in bytes
pub const WHIRLPOOL_SIZE: usize = 64;

/// 512-bit Whirlpool digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WhirlpoolDigest([u8; WHIRLPOOL_SIZE]);

impl WhirlpoolDigest {
    /// Create a digest from raw bytes
    pub const fn from_bytes(bytes: [u8; WHIRLPOOL_SIZE]) -> Self {
        Self(bytes)
    }

    /// Compute the digest of `data`
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Whirlpool::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; WHIRLPOOL_SIZE];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; WHIRLPOOL_SIZE] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for WhirlpoolDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for WhirlpoolDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WhirlpoolDigest({})", self.to_hex())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whirlpool_empty_input() {
        let digest = WhirlpoolDigest::from_data(b"");
        assert!(digest.to_hex().starts_with("19fa61d75522a4669b44e39c1d2e1726"));
    }

    #[test]
    fn test_whirlpool_from_bytes() {
        let digest = WhirlpoolDigest::from_bytes([0xAB; WHIRLPOOL_SIZE]);
        assert_eq!(digest.as_bytes(), &[0xAB; 64]);
        assert!(digest.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_whirlpool_deterministic() {
        assert_eq!(
            WhirlpoolDigest::from_data(b"cache"),
            WhirlpoolDigest::from_data(b"cache")
        );
        assert_ne!(
            WhirlpoolDigest::from_data(b"cache"),
            WhirlpoolDigest::from_data(b"cachf")
        );
    }
}
