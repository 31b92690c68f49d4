//! Java client disk cache backend
//!
//! The disk cache is one data file plus one index file per index:
//!
//! ```text
//! main_file_cache.dat2       520-byte sectors
//! main_file_cache.idx0..254  6-byte records per file: u24 size, u24 first sector
//! main_file_cache.idx255     records for the reference tables
//! ```
//!
//! Each sector starts with a header naming its owner and the next sector of
//! the chain:
//!
//! ```text
//! file ids <= 65535:  u16 file, u16 chunk, u24 next, u8 index   (8 bytes, 512 data)
//! file ids  > 65535:  u32 file, u16 chunk, u24 next, u8 index   (10 bytes, 510 data)
//! ```
//!
//! Every sector of a chain is checked against the file, chunk sequence and
//! index it is read for. The data file is memory mapped; index files are
//! small and read into memory.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use binrw::BinRead;
use memmap2::{Mmap, MmapOptions};
use tracing::{debug, info, warn};

use crate::backend::CacheStorage;
use crate::{Result, StorageError};
use runecache_formats::REFERENCE_TABLE_INDEX;

/// Data file name
pub const DATA_FILE: &str = "main_file_cache.dat2";

/// Prefix of index file names
pub const INDEX_FILE_PREFIX: &str = "main_file_cache.idx";

/// Sector size in the data file
pub const SECTOR_SIZE: usize = 520;

/// Size of one index record
pub const INDEX_RECORD_SIZE: usize = 6;

const SECTOR_HEADER_SIZE: usize = 8;
const EXTENDED_SECTOR_HEADER_SIZE: usize = 10;

/// Location of a file in the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct IndexRecord {
    /// File size in bytes
    #[br(map = |x: [u8; 3]| u32::from_be_bytes([0, x[0], x[1], x[2]]))]
    pub size: u32,

    /// First sector of the chain
    #[br(map = |x: [u8; 3]| u32::from_be_bytes([0, x[0], x[1], x[2]]))]
    pub sector: u32,
}

impl IndexRecord {
    /// Whether the record points at nothing
    pub const fn is_empty(&self) -> bool {
        self.size == 0 && self.sector == 0
    }
}

/// Header at the start of every sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big, import(extended: bool))]
struct SectorHeader {
    #[br(parse_with = read_file_id, args(extended))]
    file: u32,

    chunk: u16,

    #[br(map = |x: [u8; 3]| u32::from_be_bytes([0, x[0], x[1], x[2]]))]
    next: u32,

    index: u8,
}

#[binrw::parser(reader, endian)]
fn read_file_id(extended: bool) -> binrw::BinResult<u32> {
    if extended {
        u32::read_options(reader, endian, ())
    } else {
        u16::read_options(reader, endian, ()).map(u32::from)
    }
}

/// Disk cache backed by a memory-mapped data file
pub struct Dat2Storage {
    root: PathBuf,
    data: Mmap,
    indexes: BTreeMap<u8, Vec<u8>>,
}

impl std::fmt::Debug for Dat2Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dat2Storage")
            .field("root", &self.root)
            .field("data_len", &self.data.len())
            .field("indexes", &self.indexes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Dat2Storage {
    /// Open the disk cache in `root`
    ///
    /// # Errors
    ///
    /// Returns error if the data file or index files cannot be opened or
    /// memory mapped
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        info!("Opening disk cache at {}", root.display());

        let data_path = root.join(DATA_FILE);
        if !data_path.is_file() {
            return Err(StorageError::Config(format!(
                "{} not found in {}",
                DATA_FILE,
                root.display()
            )));
        }
        let data = map_data_file(&data_path)?;

        let mut indexes = BTreeMap::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            let Some(id) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(INDEX_FILE_PREFIX))
                .and_then(|suffix| suffix.parse::<u8>().ok())
            else {
                continue;
            };

            let index = std::fs::read(&path)?;
            if index.len() % INDEX_RECORD_SIZE != 0 {
                warn!(
                    "Index file {} has {} trailing bytes",
                    path.display(),
                    index.len() % INDEX_RECORD_SIZE
                );
            }
            debug!("Loaded index {} ({} records)", id, index.len() / INDEX_RECORD_SIZE);
            indexes.insert(id, index);
        }

        info!(
            "Opened disk cache with {} index files, {} sectors",
            indexes.len(),
            data.len() / SECTOR_SIZE
        );

        Ok(Self {
            root,
            data,
            indexes,
        })
    }

    /// Cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index record of `(index, file)`, if the index file covers it
    pub fn record(&self, index: u8, file: u32) -> Result<Option<IndexRecord>> {
        let Some(idx) = self.indexes.get(&index) else {
            return Ok(None);
        };

        let offset = file as usize * INDEX_RECORD_SIZE;
        let Some(bytes) = idx.get(offset..offset + INDEX_RECORD_SIZE) else {
            return Ok(None);
        };

        let record = IndexRecord::read(&mut Cursor::new(bytes))
            .map_err(|e| StorageError::InvalidFormat(format!("index record: {e}")))?;
        Ok((!record.is_empty()).then_some(record))
    }

    fn read_chain(&self, index: u8, file: u32, record: IndexRecord) -> Result<Vec<u8>> {
        let extended = file > 0xFFFF;
        let header_size = if extended {
            EXTENDED_SECTOR_HEADER_SIZE
        } else {
            SECTOR_HEADER_SIZE
        };
        let data_size = SECTOR_SIZE - header_size;
        let size = record.size as usize;

        let mut out = Vec::with_capacity(size);
        let mut sector = record.sector as usize;
        let mut chunk = 0u16;

        while out.len() < size {
            if sector == 0 {
                return Err(StorageError::InvalidFormat(format!(
                    "sector chain of {index}/{file} ends after {} of {size} bytes",
                    out.len()
                )));
            }

            let offset = sector * SECTOR_SIZE;
            let remaining = (size - out.len()).min(data_size);
            let Some(bytes) = self.data.get(offset..offset + header_size + remaining) else {
                return Err(StorageError::InvalidFormat(format!(
                    "sector {sector} of {index}/{file} lies beyond the data file"
                )));
            };

            let header = SectorHeader::read_args(&mut Cursor::new(bytes), (extended,))
                .map_err(|e| StorageError::InvalidFormat(format!("sector {sector} header: {e}")))?;

            if header.file != file || header.chunk != chunk || header.index != index {
                return Err(StorageError::InvalidFormat(format!(
                    "sector {sector} belongs to {}/{} chunk {}, expected {index}/{file} chunk {chunk}",
                    header.index, header.file, header.chunk
                )));
            }

            out.extend_from_slice(&bytes[header_size..]);
            sector = header.next as usize;
            chunk = chunk.wrapping_add(1);
        }

        debug!("Read {}/{} ({} bytes, {} sectors)", index, file, size, chunk);
        Ok(out)
    }
}

fn map_data_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;

    if file.metadata()?.len() < SECTOR_SIZE as u64 {
        return Err(StorageError::InvalidFormat(format!(
            "{} is smaller than one sector",
            path.display()
        )));
    }

    // Memory-map the file for efficient access
    #[allow(unsafe_code)]
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    Ok(mmap)
}

impl CacheStorage for Dat2Storage {
    fn read_file_bytes(&self, index: u8, file: u32) -> Result<Vec<u8>> {
        let record = self
            .record(index, file)?
            .ok_or(StorageError::NotFound { index, file })?;
        self.read_chain(index, file, record)
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        Ok(self
            .indexes
            .keys()
            .copied()
            .filter(|&index| index != REFERENCE_TABLE_INDEX)
            .collect())
    }
}
