//! Splitting multi-entry payloads
//!
//! A file holding more than one entry ends with a trailer:
//!
//! ```text
//! [ segment data ... ][ i32 delta × chunks × entries ][ u8 chunks ]
//! ```
//!
//! Deltas are grouped chunk-major. Within one chunk the running sum of the
//! deltas gives each entry's segment length. Segment data is laid out in the
//! same order, so an entry's bytes are the concatenation of its segment from
//! every chunk. Files with a single entry carry no trailer.
//!
//! Payloads stored in more than one chunk are regrouped so that every entry
//! occupies one contiguous range, with entries following each other in id
//! order.

use std::collections::BTreeMap;
use std::ops::Range;

use binrw::BinReaderExt;
use std::io::Cursor;

use crate::error::{DecodeError, DecodeResult};

/// Split `payload` into entries keyed by `entry_ids` (ascending).
///
/// Returns the entry data with the trailer removed, plus the range of every
/// entry. The ranges are contiguous, ordered by id, and cover the returned
/// data exactly.
pub fn split_entries(
    mut payload: Vec<u8>,
    entry_ids: &[u32],
) -> DecodeResult<(Vec<u8>, BTreeMap<u32, Range<usize>>)> {
    match entry_ids {
        [] => Err(DecodeError::MalformedTable(
            "file declares an empty entry list".to_string(),
        )),
        [id] => {
            let range = 0..payload.len();
            Ok((payload, BTreeMap::from([(*id, range)])))
        }
        _ => {
            let lengths = read_trailer(&payload, entry_ids.len())?;
            let data_len = payload.len() - trailer_size(lengths.len(), entry_ids.len());

            let total: usize = lengths.iter().flatten().sum();
            if total != data_len {
                return Err(DecodeError::size_mismatch("entry data length", total, data_len));
            }
            payload.truncate(data_len);

            let data = if lengths.len() == 1 {
                payload
            } else {
                regroup(&payload, &lengths, entry_ids.len())
            };

            let mut offset = 0usize;
            let entries = entry_ids
                .iter()
                .enumerate()
                .map(|(position, &id)| {
                    let length: usize = lengths.iter().map(|chunk| chunk[position]).sum();
                    let range = offset..offset + length;
                    offset += length;
                    (id, range)
                })
                .collect();

            Ok((data, entries))
        }
    }
}

/// Copy chunk-major segments into entry-major order
fn regroup(payload: &[u8], lengths: &[Vec<usize>], entry_count: usize) -> Vec<u8> {
    let mut starts: Vec<Vec<usize>> = Vec::with_capacity(lengths.len());
    let mut offset = 0usize;
    for chunk in lengths {
        starts.push(
            chunk
                .iter()
                .map(|&length| {
                    let start = offset;
                    offset += length;
                    start
                })
                .collect(),
        );
    }

    let mut data = Vec::with_capacity(payload.len());
    for entry in 0..entry_count {
        for (chunk, chunk_starts) in lengths.iter().zip(&starts) {
            let start = chunk_starts[entry];
            data.extend_from_slice(&payload[start..start + chunk[entry]]);
        }
    }
    data
}

fn trailer_size(chunks: usize, entries: usize) -> usize {
    1 + chunks * entries * 4
}

/// Read per-chunk, per-entry segment lengths from the trailer.
fn read_trailer(payload: &[u8], entry_count: usize) -> DecodeResult<Vec<Vec<usize>>> {
    let Some(&chunks) = payload.last() else {
        return Err(DecodeError::TruncatedData(
            "multi-entry payload is empty".to_string(),
        ));
    };

    if chunks == 0 {
        return Err(DecodeError::CorruptData(
            "multi-entry payload declares zero chunks".to_string(),
        ));
    }

    let chunks = usize::from(chunks);
    let trailer = trailer_size(chunks, entry_count);
    if trailer > payload.len() {
        return Err(DecodeError::TruncatedData(format!(
            "entry trailer needs {trailer} bytes, payload has {}",
            payload.len()
        )));
    }

    let start = payload.len() - trailer;
    let mut reader = Cursor::new(&payload[start..payload.len() - 1]);
    let mut lengths = Vec::with_capacity(chunks);

    for chunk in 0..chunks {
        let mut running = 0i32;
        let mut chunk_lengths = Vec::with_capacity(entry_count);

        for entry in 0..entry_count {
            let delta: i32 = reader.read_be()?;
            running = running.checked_add(delta).ok_or_else(|| {
                DecodeError::CorruptData(format!(
                    "segment length overflows in chunk {chunk}, entry {entry}"
                ))
            })?;
            let length = usize::try_from(running).map_err(|_| {
                DecodeError::CorruptData(format!(
                    "negative segment length {running} in chunk {chunk}, entry {entry}"
                ))
            })?;
            chunk_lengths.push(length);
        }

        lengths.push(chunk_lengths);
    }

    Ok(lengths)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use runecache_test_utils::group::encode_entries;

    #[test]
    fn test_single_entry_has_no_trailer() {
        let (data, entries) = split_entries(b"whole".to_vec(), &[3]).unwrap();
        assert_eq!(data, b"whole");
        assert_eq!(entries[&3], 0..5);
    }

    #[test]
    fn test_single_chunk_split() {
        let payload = encode_entries(&[b"ab".to_vec(), b"cde".to_vec(), Vec::new()], 1);
        let (data, entries) = split_entries(payload, &[0, 4, 9]).unwrap();

        assert_eq!(data, b"abcde");
        assert_eq!(entries[&0], 0..2);
        assert_eq!(entries[&4], 2..5);
        assert_eq!(entries[&9], 5..5);
    }

    #[test]
    fn test_multi_chunk_entries_are_contiguous() {
        let payload = encode_entries(&[b"aaaaaa".to_vec(), b"bbbbbbbb".to_vec()], 3);
        let (data, entries) = split_entries(payload, &[10, 11]).unwrap();

        assert_eq!(data, b"aaaaaabbbbbbbb");
        assert_eq!(entries[&10], 0..6);
        assert_eq!(entries[&11], 6..14);
    }

    #[test]
    fn test_uneven_chunks_regroup_in_id_order() {
        // chunk 0: "x" for entry 0, "" for entry 1, "pq" for entry 2
        // chunk 1: "yz" for entry 0, "m" for entry 1, "" for entry 2
        let mut payload = b"xpqyzm".to_vec();
        for delta in [1i32, -1, 2, 2, -1, -1] {
            payload.extend_from_slice(&delta.to_be_bytes());
        }
        payload.push(2);

        let (data, entries) = split_entries(payload, &[1, 5, 6]).unwrap();
        assert_eq!(data, b"xyzmpq");
        assert_eq!(entries[&1], 0..3);
        assert_eq!(entries[&5], 3..4);
        assert_eq!(entries[&6], 4..6);
    }

    #[test]
    fn test_zero_chunks_rejected() {
        let err = split_entries(vec![1, 2, 3, 0], &[0, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::CorruptData(_)));
    }

    #[test]
    fn test_trailer_longer_than_payload() {
        let err = split_entries(vec![0, 0, 5], &[0, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedData(_)));
    }

    #[test]
    fn test_negative_segment_length() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-1i32).to_be_bytes());
        payload.extend_from_slice(&1i32.to_be_bytes());
        payload.push(1);
        let err = split_entries(payload, &[0, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::CorruptData(_)));
    }

    #[test]
    fn test_lengths_disagree_with_data() {
        let mut payload = encode_entries(&[b"ab".to_vec(), b"cd".to_vec()], 1);
        payload.insert(0, b'x');
        let err = split_entries(payload, &[0, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::SizeMismatch { .. }));
    }

    proptest! {
        #[test]
        fn entries_concatenate_to_data(
            entries in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 2..8),
            chunks in 1u8..4
        ) {
            let ids: Vec<u32> = (0..entries.len() as u32).map(|i| i * 3).collect();
            let payload = encode_entries(&entries, chunks);
            let (data, layout) = split_entries(payload, &ids).unwrap();

            let mut cursor = 0;
            for (id, original) in ids.iter().zip(&entries) {
                let range = layout[id].clone();
                prop_assert_eq!(range.start, cursor);
                prop_assert_eq!(&data[range.clone()], original.as_slice());
                cursor = range.end;
            }
            prop_assert_eq!(cursor, data.len());
            prop_assert_eq!(data, entries.concat());
        }
    }
}
