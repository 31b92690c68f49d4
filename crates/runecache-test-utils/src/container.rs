//! Container encoding

use runecache_crypto::{XteaKey, xtea};

use crate::compress;

/// Builds raw container bytes
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    payload: Vec<u8>,
    compression: u8,
    key: Option<XteaKey>,
    version: Option<u16>,
    declared_length: Option<u32>,
}

impl ContainerBuilder {
    /// Uncompressed, unencrypted container holding `payload`
    pub fn new(payload: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            compression: 0,
            key: None,
            version: None,
            declared_length: None,
        }
    }

    /// Compress with the codec of container tag `tag`
    pub fn compression(mut self, tag: u8) -> Self {
        self.compression = tag;
        self
    }

    /// Encrypt the body with `key`
    pub fn encrypt(mut self, key: XteaKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Append a version stamp
    pub fn version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    /// Override the decompressed length field
    pub fn declared_length(mut self, length: u32) -> Self {
        self.declared_length = Some(length);
        self
    }

    /// Encode the container
    pub fn build(&self) -> Vec<u8> {
        let compressed = compress::by_tag(self.compression, &self.payload);

        let mut out = vec![self.compression];
        out.extend_from_slice(&u32::try_from(compressed.len()).unwrap().to_be_bytes());
        if self.compression != 0 {
            let length = self
                .declared_length
                .unwrap_or_else(|| u32::try_from(self.payload.len()).unwrap());
            out.extend_from_slice(&length.to_be_bytes());
        }
        out.extend_from_slice(&compressed);

        if let Some(key) = &self.key {
            xtea::encrypt_in_place(key, &mut out[5..]);
        }

        if let Some(version) = self.version {
            out.extend_from_slice(&version.to_be_bytes());
        }

        out
    }
}
