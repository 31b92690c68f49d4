//! Storage backends and cache facade for JS5 asset caches.
//!
//! This crate maps `(index, file)` identifiers to raw container bytes and
//! wires those bytes through the decoders in `runecache-formats`:
//!
//! - **Memory**: [`MemoryStorage`], a map of raw containers
//! - **Flat**: [`FlatStorage`], one file per container under `<root>/<index>/<file>`
//! - **Disk cache**: [`Dat2Storage`], the Java client's `main_file_cache.dat2`
//!   plus `main_file_cache.idxN` files
//!
//! # Storage Layout
//!
//! Index 255 holds the reference table of every other index: the raw table
//! of index `n` is file `n` of index 255.
//!
//! # Example
//!
//! ```rust,no_run
//! use runecache_storage::{Cache, Dat2Storage};
//! use runecache_crypto::NoKeys;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Dat2Storage::open("/path/to/cache")?;
//! let cache = Cache::new(storage, NoKeys);
//!
//! let table = cache.reference_table(2)?;
//! println!("Index 2 has {} files", table.len());
//!
//! let file = cache.file(2, 10)?;
//! println!("File 2/10 is {} bytes", file.data.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use runecache_crypto::CryptoError;
use runecache_formats::DecodeError;
use thiserror::Error;

// Backend trait and in-memory backend
pub mod backend;

// Flat directory backend
pub mod flat;

// Java client disk cache backend
pub mod dat2;

// Configuration
pub mod config;

// Decoding facade
mod cache;

pub use backend::{CacheStorage, MemoryStorage};
pub use cache::Cache;
pub use config::{BackendKind, StorageConfig};
pub use dat2::Dat2Storage;
pub use flat::FlatStorage;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No such file in the cache.
    #[error("File {index}/{file} not found")]
    NotFound {
        /// Index id
        index: u8,
        /// File id
        file: u32,
    },

    /// Invalid on-disk structure.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Container or reference table failed to decode.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Key material could not be loaded.
    #[error("Key error: {0}")]
    Crypto(#[from] CryptoError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
