//! Test utilities for runecache
//!
//! Provides fixture encoders for the formats the library crates only decode,
//! and discovery of a real cache for tests that want one.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::cast_possible_truncation)]

pub mod compress;
pub mod container;
pub mod disk;
pub mod group;
pub mod table;

use std::path::{Path, PathBuf};

/// Environment variable naming a real cache directory
pub const CACHE_ENV_VAR: &str = "RUNECACHE_TEST_CACHE";

/// Attempts to locate a real disk cache
pub fn find_cache_data() -> Option<PathBuf> {
    // Strategy 1: Check environment variable
    if let Ok(path) = std::env::var(CACHE_ENV_VAR) {
        let path = PathBuf::from(shellexpand::tilde(&path).to_string());
        if is_valid_cache(&path) {
            return Some(path);
        }
    }

    // Strategy 2: Check the default client cache location
    ["~/jagexcache/runescape/LIVE", "~/.runite_rs/runescape"]
        .into_iter()
        .map(|path| PathBuf::from(shellexpand::tilde(path).to_string()))
        .find(|path| is_valid_cache(path))
}

/// Check if a path holds a disk cache with reference tables
pub fn is_valid_cache(path: &Path) -> bool {
    path.is_dir()
        && path.join("main_file_cache.dat2").is_file()
        && path.join("main_file_cache.idx255").is_file()
}

/// Print instructions for pointing tests at a real cache
pub fn print_setup_instructions() {
    println!("Cache Setup Instructions:");
    println!("=========================");
    println!();
    println!("To run tests that read a real cache, set:");
    println!();
    println!("  {CACHE_ENV_VAR} = /path/to/cache");
    println!();
    println!("The directory should contain:");
    println!("  - main_file_cache.dat2");
    println!("  - main_file_cache.idx255");
    println!("  - main_file_cache.idx0 .. idxN");
}

/// Get a real cache path or skip the test with a helpful message
#[macro_export]
macro_rules! require_cache_data {
    () => {
        match $crate::find_cache_data() {
            Some(path) => path,
            None => {
                println!("Skipping test - no cache found");
                $crate::print_setup_instructions();
                return;
            }
        }
    };
}
