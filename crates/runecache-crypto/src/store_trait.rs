//! Trait-based abstraction for XTEA key lookup
//!
//! Decoders never look keys up themselves: callers resolve a key through an
//! [`XteaKeyProvider`] and hand it to the decoder. This keeps key storage
//! pluggable (JSON files, databases, remote services) without touching the
//! decode path.

use crate::keys::{XteaKey, XteaKeyStore};

/// Lookup interface for XTEA keys
pub trait XteaKeyProvider: Send + Sync {
    /// Get the key for `file` of `index`, or for the index itself when `file`
    /// is `None` (encrypted reference tables).
    fn lookup_key(&self, index: u8, file: Option<u32>) -> Option<XteaKey>;
}

impl XteaKeyProvider for XteaKeyStore {
    fn lookup_key(&self, index: u8, file: Option<u32>) -> Option<XteaKey> {
        self.get(index, file)
    }
}

/// Provider that never has a key
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeys;

impl XteaKeyProvider for NoKeys {
    fn lookup_key(&self, _index: u8, _file: Option<u32>) -> Option<XteaKey> {
        None
    }
}

impl<T: XteaKeyProvider + ?Sized> XteaKeyProvider for std::sync::Arc<T> {
    fn lookup_key(&self, index: u8, file: Option<u32>) -> Option<XteaKey> {
        (**self).lookup_key(index, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_as_provider() {
        let mut store = XteaKeyStore::new();
        store.insert(5, 3, XteaKey::from_words([9, 9, 9, 9]));

        let provider: &dyn XteaKeyProvider = &store;
        assert!(provider.lookup_key(5, Some(3)).is_some());
        assert!(provider.lookup_key(5, Some(4)).is_none());
    }

    #[test]
    fn test_no_keys() {
        assert!(NoKeys.lookup_key(5, Some(1)).is_none());
        assert!(NoKeys.lookup_key(255, None).is_none());
    }
}
