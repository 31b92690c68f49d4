//! Command-line tooling for JS5 asset caches
//!
//! The `runecache` binary is a thin wrapper over these modules; report
//! rendering writes to any [`std::io::Write`] so it can be exercised
//! against in-memory caches.

pub mod filter;
pub mod format;
pub mod info;

pub use filter::{FileFilter, FilterError};

/// Successful run
pub const EXIT_OK: u8 = 0;

/// Any failure other than a bad argument
pub const EXIT_FAILURE: u8 = 1;

/// Missing or invalid argument
pub const EXIT_INVALID_ARGUMENT: u8 = 2;
