//! XTEA key management
//!
//! Keys are 128-bit values made of four 32-bit words. They are looked up by
//! cache index and, optionally, file id. Map squares are the usual consumer:
//! every encrypted landscape file has its own key.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::CryptoError;

/// A 128-bit XTEA key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XteaKey([u32; 4]);

impl XteaKey {
    /// The all-zero key, used by key lists to mean "not encrypted"
    pub const ZERO: Self = Self([0; 4]);

    /// Create a key from four words
    pub const fn from_words(words: [u32; 4]) -> Self {
        Self(words)
    }

    /// Create a key from four signed words, as found in JSON key lists
    pub const fn from_signed(words: [i32; 4]) -> Self {
        Self([
            words[0] as u32,
            words[1] as u32,
            words[2] as u32,
            words[3] as u32,
        ])
    }

    /// Create a key from 16 big-endian bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    /// Parse key from a 32 character hex string
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim();
        let bytes = hex::decode(hex)
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex: {e}")))?;

        let bytes: [u8; 16] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeySize {
                    expected: 16,
                    actual: bytes.len(),
                })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Key words
    pub const fn words(&self) -> [u32; 4] {
        self.0
    }

    /// Key as 16 big-endian bytes
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Whether this is the all-zero key
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Key as uppercase hex
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }
}

impl fmt::Display for XteaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for XteaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XteaKey({})", self.to_hex())
    }
}

/// One record of a JSON key list
#[derive(Debug, Deserialize)]
struct KeyRecord {
    archive: u8,
    group: u32,
    key: [i32; 4],
}

/// Store for XTEA keys, by index and file
#[derive(Debug, Clone, Default)]
pub struct XteaKeyStore {
    file_keys: HashMap<(u8, u32), XteaKey>,
}

impl XteaKeyStore {
    /// Create an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key for one file of an index
    pub fn insert(&mut self, index: u8, file: u32, key: XteaKey) {
        self.file_keys.insert((index, file), key);
    }

    /// Get the key for a file
    ///
    /// Keys are stored per file, so a lookup without a file finds nothing.
    /// Zero keys are treated as absent.
    pub fn get(&self, index: u8, file: Option<u32>) -> Option<XteaKey> {
        file.and_then(|file| self.file_keys.get(&(index, file)))
            .copied()
            .filter(|key| !key.is_zero())
    }

    /// Number of keys in the store
    pub fn len(&self) -> usize {
        self.file_keys.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.file_keys.is_empty()
    }

    /// Load keys from a JSON key list
    ///
    /// The expected shape is an array of objects carrying at least
    /// `archive`, `group` and `key` (four signed words). Other fields are
    /// ignored. Returns the number of keys loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use runecache_crypto::XteaKeyStore;
    ///
    /// let json = r#"[
    ///     {"archive": 5, "group": 1, "name_hash": -1153472937, "key": [1, 2, 3, -4]}
    /// ]"#;
    ///
    /// let mut store = XteaKeyStore::new();
    /// assert_eq!(store.load_from_json(json).unwrap(), 1);
    /// assert!(store.get(5, Some(1)).is_some());
    /// ```
    pub fn load_from_json(&mut self, content: &str) -> Result<usize, CryptoError> {
        let records: Vec<KeyRecord> = serde_json::from_str(content)?;
        let count = records.len();

        for record in records {
            self.insert(record.archive, record.group, XteaKey::from_signed(record.key));
        }

        Ok(count)
    }

    /// Load keys from text content
    ///
    /// Each line is `index file key`, where `key` is either 32 hex digits or
    /// four decimal words. Lines starting with `#` or `//` are comments;
    /// malformed lines are skipped. Returns the number of keys loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use runecache_crypto::XteaKeyStore;
    ///
    /// let txt = r#"
    /// # index file key
    /// 5 1 000102030405060708090A0B0C0D0E0F
    /// 5 2 -1 2 -3 4
    /// "#;
    ///
    /// let mut store = XteaKeyStore::new();
    /// assert_eq!(store.load_from_txt(txt), 2);
    /// ```
    pub fn load_from_txt(&mut self, content: &str) -> usize {
        let mut count = 0;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            if let Some((index, file, key)) = parse_txt_line(line) {
                self.insert(index, file, key);
                count += 1;
            }
        }

        count
    }
}

fn parse_txt_line(line: &str) -> Option<(u8, u32, XteaKey)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let index = parts.first()?.parse().ok()?;
    let file = parts.get(1)?.parse().ok()?;

    let key = match parts.len() {
        3 => XteaKey::from_hex(parts[2]).ok()?,
        6 => {
            let mut words = [0i32; 4];
            for (word, part) in words.iter_mut().zip(&parts[2..]) {
                *word = part.parse().ok()?;
            }
            XteaKey::from_signed(words)
        }
        _ => return None,
    };

    Some((index, file, key))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_hex_round_trip() {
        let key = XteaKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(key.words(), [0x0001_0203, 0x0405_0607, 0x0809_0A0B, 0x0C0D_0E0F]);
        assert_eq!(key.to_hex(), "000102030405060708090A0B0C0D0E0F");
    }

    #[test]
    fn test_key_invalid_length() {
        let err = XteaKey::from_hex("0001").unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeySize {
                expected: 16,
                actual: 2
            }
        ));
        assert!(XteaKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_signed_words() {
        let key = XteaKey::from_signed([-1, 0, 1, i32::MIN]);
        assert_eq!(key.words(), [u32::MAX, 0, 1, 0x8000_0000]);
    }

    #[test]
    fn test_store_lookup_by_index_and_file() {
        let mut store = XteaKeyStore::new();
        store.insert(5, 10, XteaKey::from_words([1, 1, 1, 1]));
        store.insert(5, 10, XteaKey::from_words([2, 2, 2, 2]));

        assert_eq!(store.get(5, Some(10)), Some(XteaKey::from_words([2, 2, 2, 2])));
        assert_eq!(store.get(5, Some(11)), None);
        assert_eq!(store.get(5, None), None);
        assert_eq!(store.get(6, Some(10)), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_zero_key_is_absent() {
        let mut store = XteaKeyStore::new();
        store.insert(5, 1, XteaKey::ZERO);
        assert_eq!(store.get(5, Some(1)), None);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"[
            {"archive": 5, "group": 1, "name_hash": 12, "name": "l50_50", "mapsquare": 12850, "key": [-1, 2, -3, 4]},
            {"archive": 5, "group": 7, "key": [0, 0, 0, 9]}
        ]"#;

        let mut store = XteaKeyStore::new();
        assert_eq!(store.load_from_json(json).unwrap(), 2);
        assert_eq!(store.get(5, Some(1)), Some(XteaKey::from_signed([-1, 2, -3, 4])));
        assert_eq!(store.get(5, Some(7)), Some(XteaKey::from_words([0, 0, 0, 9])));
    }

    #[test]
    fn test_load_from_json_rejects_garbage() {
        let mut store = XteaKeyStore::new();
        assert!(matches!(
            store.load_from_json("{not json"),
            Err(CryptoError::KeyFile(_))
        ));
    }

    #[test]
    fn test_load_from_txt_skips_malformed() {
        let txt = "
            # comment
            // other comment
            5 1 000102030405060708090a0b0c0d0e0f
            5 2 1 2 3 4
            5 three 1 2 3 4
            5 4 0001
        ";

        let mut store = XteaKeyStore::new();
        assert_eq!(store.load_from_txt(txt), 2);
        assert_eq!(store.get(5, Some(2)), Some(XteaKey::from_words([1, 2, 3, 4])));
    }
}
