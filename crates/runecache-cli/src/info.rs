//! `info` command: index and file reports

use std::io::Write;

use anyhow::{Context, Result};
use runecache_crypto::XteaKeyProvider;
use runecache_formats::CompressionType;
use runecache_storage::{Cache, CacheStorage};
use tracing::debug;

use crate::filter::FileFilter;
use crate::format;

/// Number of ids shown at each end of an index report
const ID_PREVIEW: usize = 5;

/// Number of bytes shown at each end of a file report
const BYTE_PREVIEW: usize = 10;

/// Write the report for `index`, or for each of `files` when given
pub fn run<S, K>(
    cache: &Cache<S, K>,
    index: u8,
    files: Option<&FileFilter>,
    out: &mut impl Write,
) -> Result<()>
where
    S: CacheStorage,
    K: XteaKeyProvider,
{
    match files {
        None => index_report(cache, index, out),
        Some(filter) => {
            for (i, file) in filter.ids().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                file_report(cache, index, file, out)?;
            }
            Ok(())
        }
    }
}

/// Summary of an index's reference table
pub fn index_report<S, K>(cache: &Cache<S, K>, index: u8, out: &mut impl Write) -> Result<()>
where
    S: CacheStorage,
    K: XteaKeyProvider,
{
    writeln!(out, "Retrieving info for index {index}...")?;
    let name = Cache::<S, K>::index_name(index).unwrap_or("IHaveNoIdea");
    writeln!(out, "Contents: {name} (probably)")?;

    let table = cache
        .reference_table(index)
        .with_context(|| format!("Failed to read reference table for index {index}"))?;
    debug!("Reference table {} has {} files", index, table.len());

    writeln!(out, "Files: {}", format::thousands(table.len()))?;
    writeln!(out, "Format: {}", table.format)?;
    writeln!(out, "Version: {}", format::version(table.version))?;
    writeln!(out, "Options: {}", table.options)?;

    if !table.is_empty() {
        let first = table.file_ids().take(ID_PREVIEW);
        let last = table.file_ids().skip(table.len().saturating_sub(ID_PREVIEW));
        writeln!(out, "First files: {}", format::id_list(first))?;
        writeln!(out, "Last files: {}", format::id_list(last))?;
    }

    Ok(())
}

/// Metadata and content preview of one file
pub fn file_report<S, K>(
    cache: &Cache<S, K>,
    index: u8,
    file: u32,
    out: &mut impl Write,
) -> Result<()>
where
    S: CacheStorage,
    K: XteaKeyProvider,
{
    writeln!(out, "Retrieving info for file {index}/{file}...")?;
    let decoded = cache
        .file(index, file)
        .with_context(|| format!("Failed to decode file {index}/{file}"))?;
    let info = &decoded.info;
    let data = &decoded.data;

    writeln!(out, "Size: {}", format::thousands(data.len()))?;
    writeln!(
        out,
        "Compression type: {}",
        info.compression.unwrap_or(CompressionType::None)
    )?;
    if let Some(size) = info.compressed_size {
        writeln!(out, "Compressed size: {}", format::thousands(size as usize))?;
    }
    if info.version.is_some() {
        writeln!(out, "Version: {}", format::version(info.version))?;
    }
    if let Some(crc) = info.crc {
        writeln!(out, "CRC: {crc}")?;
    }
    if info.has_entries() {
        writeln!(out, "Entries: {}", format::thousands(decoded.entry_count()))?;
    }
    if let Some(identifier) = info.identifier {
        writeln!(out, "Identifier: {identifier}")?;
    }
    if let Some(hash) = info.mystery_hash {
        writeln!(out, "Mystery hash: {hash}")?;
    }
    if let Some(digest) = &info.whirlpool {
        writeln!(out, "Whirlpool: {}", format::hex(digest.as_bytes()))?;
    }
    if let Some(key) = &info.encryption_key {
        writeln!(out, "Encryption key: {}", format::hex(&key.to_bytes()))?;
    }

    if data.len() < BYTE_PREVIEW {
        writeln!(out, "Bytes: {}", format::bytes(data))?;
    } else {
        let last = &data[data.len() - BYTE_PREVIEW..];
        writeln!(out, "First 10 bytes: {}", format::bytes(&data[..BYTE_PREVIEW]))?;
        writeln!(out, "Last 10 bytes: {}", format::bytes(last))?;
    }

    Ok(())
}
