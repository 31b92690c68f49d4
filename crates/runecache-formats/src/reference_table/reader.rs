//! Sequential reader for reference table bodies

use std::io::Cursor;

use binrw::BinReaderExt;

use super::TableFormat;
use super::options::TableOptions;
use crate::error::{DecodeError, DecodeResult};

/// Columns present in a table, resolved once from its format and options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldLayout {
    pub smart_counts: bool,
    pub identifiers: bool,
    pub mystery_hashes: bool,
    pub whirlpool_digests: bool,
    pub sizes: bool,
}

impl FieldLayout {
    pub fn new(format: TableFormat, options: TableOptions) -> Self {
        Self {
            smart_counts: format.uses_smart_counts(),
            identifiers: options.has_identifiers(),
            mystery_hashes: options.has_mystery_hashes(),
            whirlpool_digests: options.has_whirlpool_digests(),
            sizes: options.has_sizes(),
        }
    }

    /// Smallest encoded width of a count or delta
    pub const MIN_COUNT_WIDTH: usize = 2;
}

pub(crate) struct TableReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> TableReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn remaining(&self) -> usize {
        let data = self.cursor.get_ref();
        data.len().saturating_sub(self.cursor.position() as usize)
    }

    pub fn u8(&mut self) -> DecodeResult<u8> {
        Ok(self.cursor.read_be()?)
    }

    pub fn u16(&mut self) -> DecodeResult<u16> {
        Ok(self.cursor.read_be()?)
    }

    pub fn u32(&mut self) -> DecodeResult<u32> {
        Ok(self.cursor.read_be()?)
    }

    pub fn i32(&mut self) -> DecodeResult<i32> {
        Ok(self.cursor.read_be()?)
    }

    pub fn bytes<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        Ok(self.cursor.read_be()?)
    }

    /// Big smart: a `u32` with the high bit masked off when the next byte has
    /// its high bit set, a `u16` otherwise.
    pub fn big_smart(&mut self) -> DecodeResult<u32> {
        let position = self.cursor.position() as usize;
        let peek = self.cursor.get_ref().get(position).copied().ok_or_else(|| {
            DecodeError::TruncatedData("big smart at end of table".to_string())
        })?;

        if peek & 0x80 != 0 {
            Ok(self.u32()? & 0x7FFF_FFFF)
        } else {
            Ok(u32::from(self.u16()?))
        }
    }

    /// A count or id delta in the width used by `layout`
    pub fn count(&mut self, layout: &FieldLayout) -> DecodeResult<u32> {
        if layout.smart_counts {
            self.big_smart()
        } else {
            Ok(u32::from(self.u16()?))
        }
    }

    /// Read `n` counts, refusing counts the remaining bytes cannot hold
    pub fn counts(&mut self, n: usize, layout: &FieldLayout) -> DecodeResult<Vec<u32>> {
        self.ensure_fits(n, FieldLayout::MIN_COUNT_WIDTH, "counts")?;
        (0..n).map(|_| self.count(layout)).collect()
    }

    /// Fail early when `n` items of at least `width` bytes cannot fit
    pub fn ensure_fits(&self, n: usize, width: usize, what: &str) -> DecodeResult<()> {
        let needed = n.saturating_mul(width);
        if needed > self.remaining() {
            return Err(DecodeError::TruncatedData(format!(
                "{n} {what} need at least {needed} bytes, {} remain",
                self.remaining()
            )));
        }
        Ok(())
    }
}

/// Turn gap-encoded deltas into absolute ids.
///
/// The first delta is the first id. Later deltas must be positive, and the
/// running id must stay within `u32`.
pub(crate) fn accumulate_ids(deltas: &[u32], what: &str) -> DecodeResult<Vec<u32>> {
    deltas
        .iter()
        .enumerate()
        .try_fold(Vec::<u32>::with_capacity(deltas.len()), |mut ids, (position, &delta)| {
            let id = match ids.last() {
                None => delta,
                Some(_) if delta == 0 => {
                    return Err(DecodeError::MalformedTable(format!(
                        "duplicate {what} id at position {position}"
                    )));
                }
                Some(&previous) => previous.checked_add(delta).ok_or_else(|| {
                    DecodeError::MalformedTable(format!(
                        "{what} id overflows at position {position}"
                    ))
                })?,
            };
            ids.push(id);
            Ok(ids)
        })
}
