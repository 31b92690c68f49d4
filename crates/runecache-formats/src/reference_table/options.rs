//! Reference table option flags

use std::fmt;

/// Option flags controlling which per-file columns a table carries
///
/// Unknown bits are kept in `value` and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TableOptions {
    /// Raw flag byte
    pub value: u8,
}

impl TableOptions {
    /// No optional columns
    pub const NONE: u8 = 0x00;

    /// Name hash identifiers for files and entries (bit 0)
    pub const IDENTIFIERS: u8 = 0x01;

    /// Whirlpool digests per file (bit 1)
    pub const WHIRLPOOL_DIGESTS: u8 = 0x02;

    /// Compressed and uncompressed sizes per file (bit 2)
    pub const SIZES: u8 = 0x04;

    /// Unidentified 32-bit hash per file (bit 3)
    pub const MYSTERY_HASHES: u8 = 0x08;

    const KNOWN: [(u8, &'static str); 4] = [
        (Self::IDENTIFIERS, "Identifiers"),
        (Self::WHIRLPOOL_DIGESTS, "WhirlpoolDigests"),
        (Self::SIZES, "Sizes"),
        (Self::MYSTERY_HASHES, "MysteryHashes"),
    ];

    /// Create options from the raw flag byte
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    /// Check if flag is set
    pub const fn has(&self, flag: u8) -> bool {
        (self.value & flag) != 0
    }

    /// Whether files and entries carry identifiers
    pub const fn has_identifiers(&self) -> bool {
        self.has(Self::IDENTIFIERS)
    }

    /// Whether files carry Whirlpool digests
    pub const fn has_whirlpool_digests(&self) -> bool {
        self.has(Self::WHIRLPOOL_DIGESTS)
    }

    /// Whether files carry compressed and uncompressed sizes
    pub const fn has_sizes(&self) -> bool {
        self.has(Self::SIZES)
    }

    /// Whether files carry the mystery hash
    pub const fn has_mystery_hashes(&self) -> bool {
        self.has(Self::MYSTERY_HASHES)
    }

    /// Bits outside the known flags
    pub const fn unknown_bits(&self) -> u8 {
        self.value & !(Self::IDENTIFIERS | Self::WHIRLPOOL_DIGESTS | Self::SIZES | Self::MYSTERY_HASHES)
    }
}

impl fmt::Display for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = Self::KNOWN
            .iter()
            .filter(|(flag, _)| self.has(*flag))
            .map(|(_, name)| (*name).to_string())
            .collect();

        if self.unknown_bits() != 0 {
            names.push(format!("0x{:02X}", self.unknown_bits()));
        }

        if names.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}
