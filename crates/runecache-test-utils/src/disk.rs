//! Java-client disk cache encoding (`main_file_cache.dat2` + `.idxN`)

use std::collections::BTreeMap;
use std::path::Path;

/// Sector size in `main_file_cache.dat2`
pub const SECTOR_SIZE: usize = 520;

/// Writes a disk cache from `(index, file) -> container bytes`
#[derive(Debug, Clone, Default)]
pub struct DiskCacheBuilder {
    files: BTreeMap<(u8, u32), Vec<u8>>,
}

impl DiskCacheBuilder {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw container bytes for `(index, file)`
    pub fn file(mut self, index: u8, file: u32, data: Vec<u8>) -> Self {
        self.files.insert((index, file), data);
        self
    }

    /// Encode the data file and one index file per index
    ///
    /// Sector 0 is left empty; sector chains are written in insertion order.
    pub fn encode(&self) -> (Vec<u8>, BTreeMap<u8, Vec<u8>>) {
        let mut dat2 = vec![0u8; SECTOR_SIZE];
        let mut indexes: BTreeMap<u8, Vec<u8>> = BTreeMap::new();

        for (&(index, file), data) in &self.files {
            let first_sector = dat2.len() / SECTOR_SIZE;

            let idx = indexes.entry(index).or_default();
            let slot = file as usize * 6;
            if idx.len() < slot + 6 {
                idx.resize(slot + 6, 0);
            }
            idx[slot..slot + 3].copy_from_slice(&u24(data.len() as u32));
            idx[slot + 3..slot + 6].copy_from_slice(&u24(first_sector as u32));

            let extended = file > 0xFFFF;
            let header_size = if extended { 10 } else { 8 };
            let data_size = SECTOR_SIZE - header_size;
            let pieces: Vec<&[u8]> = if data.is_empty() {
                vec![&data[..]]
            } else {
                data.chunks(data_size).collect()
            };

            for (chunk, piece) in pieces.iter().enumerate() {
                let sector = first_sector + chunk;
                let next = if chunk + 1 == pieces.len() { 0 } else { sector + 1 };

                if extended {
                    dat2.extend_from_slice(&file.to_be_bytes());
                } else {
                    dat2.extend_from_slice(&(file as u16).to_be_bytes());
                }
                dat2.extend_from_slice(&(chunk as u16).to_be_bytes());
                dat2.extend_from_slice(&u24(next as u32));
                dat2.push(index);
                dat2.extend_from_slice(piece);
                dat2.resize(SECTOR_SIZE * (sector + 1), 0);
            }
        }

        (dat2, indexes)
    }

    /// Write `main_file_cache.dat2` and `main_file_cache.idxN` into `dir`
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        let (dat2, indexes) = self.encode();
        std::fs::write(dir.join("main_file_cache.dat2"), dat2)?;
        for (index, idx) in indexes {
            std::fs::write(dir.join(format!("main_file_cache.idx{index}")), idx)?;
        }
        Ok(())
    }
}

fn u24(value: u32) -> [u8; 3] {
    let [_, high, mid, low] = value.to_be_bytes();
    [high, mid, low]
}
