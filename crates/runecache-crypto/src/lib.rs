//! Cryptographic primitives for JS5 asset caches
//!
//! This crate provides the primitives the container decoder and its callers
//! need for decryption and integrity checks.
//!
//! # Components
//!
//! - **Encryption**: XTEA block cipher used for encrypted map and table data
//! - **Checksums**: CRC32 over raw container bytes
//! - **Digests**: Whirlpool (512-bit) over raw container bytes
//! - **Key Management**: XTEA key storage and lookup by index and file
//!
//! # Key Storage
//!
//! - [`XteaKeyStore`] - In-memory storage loaded from JSON or text key lists
//! - [`XteaKeyProvider`] - Trait for implementing custom lookup backends
//!
//! # Examples
//!
//! ## Decrypting a span
//!
//! ```
//! use runecache_crypto::{XteaKey, xtea};
//!
//! let key = XteaKey::from_words([1, 2, 3, 4]);
//! let mut data = b"sixteen byte msg".to_vec();
//! xtea::encrypt_in_place(&key, &mut data);
//! xtea::decrypt_in_place(&key, &mut data);
//! assert_eq!(&data, b"sixteen byte msg");
//! ```
//!
//! ## Checksums
//!
//! ```
//! use runecache_crypto::{crc32, WhirlpoolDigest};
//!
//! assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
//! let digest = WhirlpoolDigest::from_data(b"payload");
//! println!("whirlpool: {digest}");
//! ```

#![warn(missing_docs)]

pub mod crc;
pub mod error;
pub mod keys;
pub mod store_trait;
pub mod whirlpool;
pub mod xtea;

pub use error::CryptoError;

// Re-export commonly used types
pub use crc::crc32;
pub use keys::{XteaKey, XteaKeyStore};
pub use store_trait::{NoKeys, XteaKeyProvider};
pub use whirlpool::WhirlpoolDigest;
