//! Reference table body encoding

/// One file record of a test table
#[derive(Debug, Clone, Default)]
pub struct TestFile {
    id: u32,
    identifier: Option<i32>,
    crc: u32,
    mystery_hash: Option<i32>,
    whirlpool: Option<[u8; 64]>,
    sizes: Option<(u32, u32)>,
    version: u32,
    entries: Vec<u32>,
    entry_identifiers: Vec<i32>,
}

impl TestFile {
    /// File `id` with a single entry 0
    pub fn new(id: u32) -> Self {
        Self {
            id,
            entries: vec![0],
            ..Self::default()
        }
    }

    /// Set the name hash
    pub fn identifier(mut self, identifier: i32) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Set the CRC
    pub fn crc(mut self, crc: u32) -> Self {
        self.crc = crc;
        self
    }

    /// Set the mystery hash
    pub fn mystery_hash(mut self, hash: i32) -> Self {
        self.mystery_hash = Some(hash);
        self
    }

    /// Set the Whirlpool digest
    pub fn whirlpool(mut self, digest: [u8; 64]) -> Self {
        self.whirlpool = Some(digest);
        self
    }

    /// Set compressed and uncompressed sizes
    pub fn sizes(mut self, compressed: u32, uncompressed: u32) -> Self {
        self.sizes = Some((compressed, uncompressed));
        self
    }

    /// Set the version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set entry ids (ascending)
    pub fn entries(mut self, ids: &[u32]) -> Self {
        self.entries = ids.to_vec();
        self
    }

    /// Set entry name hashes, parallel to the entry ids
    pub fn entry_identifiers(mut self, identifiers: &[i32]) -> Self {
        self.entry_identifiers = identifiers.to_vec();
        self
    }
}

/// Builds reference table bodies
#[derive(Debug, Clone)]
pub struct TableBuilder {
    format: u8,
    version: u32,
    options: u8,
    files: Vec<TestFile>,
}

impl TableBuilder {
    /// Empty table of `format`
    pub fn new(format: u8) -> Self {
        Self {
            format,
            version: 0,
            options: 0,
            files: Vec::new(),
        }
    }

    /// Table version, written for formats 6 and above
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Raw option flags
    pub fn options(mut self, options: u8) -> Self {
        self.options = options;
        self
    }

    /// File records
    pub fn files(mut self, files: Vec<TestFile>) -> Self {
        self.files = files;
        self
    }

    fn count(&self, out: &mut Vec<u8>, value: u32) {
        if self.format >= 7 && value >= 0x8000 {
            out.extend_from_slice(&(value | 0x8000_0000).to_be_bytes());
        } else {
            out.extend_from_slice(&u16::try_from(value).unwrap().to_be_bytes());
        }
    }

    fn deltas(&self, out: &mut Vec<u8>, ids: &[u32]) {
        let mut previous = 0;
        for &id in ids {
            self.count(out, id - previous);
            previous = id;
        }
    }

    /// Encode the table body
    pub fn build(&self) -> Vec<u8> {
        let mut files = self.files.clone();
        files.sort_by_key(|file| file.id);

        let identifiers = self.options & 0x01 != 0;
        let whirlpool = self.options & 0x02 != 0;
        let sizes = self.options & 0x04 != 0;
        let mystery = self.options & 0x08 != 0;

        let mut out = vec![self.format];
        if self.format >= 6 {
            out.extend_from_slice(&self.version.to_be_bytes());
        }
        out.push(self.options);

        self.count(&mut out, u32::try_from(files.len()).unwrap());
        let ids: Vec<u32> = files.iter().map(|file| file.id).collect();
        self.deltas(&mut out, &ids);

        if identifiers {
            for file in &files {
                out.extend_from_slice(&file.identifier.unwrap_or(0).to_be_bytes());
            }
        }
        for file in &files {
            out.extend_from_slice(&file.crc.to_be_bytes());
        }
        if mystery {
            for file in &files {
                out.extend_from_slice(&file.mystery_hash.unwrap_or(0).to_be_bytes());
            }
        }
        if whirlpool {
            for file in &files {
                out.extend_from_slice(&file.whirlpool.unwrap_or([0; 64]));
            }
        }
        if sizes {
            for file in &files {
                let (compressed, uncompressed) = file.sizes.unwrap_or_default();
                out.extend_from_slice(&compressed.to_be_bytes());
                out.extend_from_slice(&uncompressed.to_be_bytes());
            }
        }
        for file in &files {
            out.extend_from_slice(&file.version.to_be_bytes());
        }
        for file in &files {
            self.count(&mut out, u32::try_from(file.entries.len()).unwrap());
        }
        for file in &files {
            self.deltas(&mut out, &file.entries);
        }
        if identifiers {
            for file in &files {
                for position in 0..file.entries.len() {
                    let identifier = file.entry_identifiers.get(position).copied().unwrap_or(0);
                    out.extend_from_slice(&identifier.to_be_bytes());
                }
            }
        }

        out
    }
}
