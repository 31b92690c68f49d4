#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for reference table decoding
//!
//! Tables are encoded with the fixture table writer, wrapped in containers
//! and decoded with `decode_reference_table`.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use runecache_crypto::XteaKey;
use runecache_formats::{
    DecodeError, FileMetadata, ReferenceTable, TableFormat, TableOptions, decode_file,
    decode_reference_table,
};
use runecache_test_utils::container::ContainerBuilder;
use runecache_test_utils::group::encode_entries;
use runecache_test_utils::table::{TableBuilder, TestFile};

fn wrap(body: &[u8], compression: u8) -> Vec<u8> {
    ContainerBuilder::new(body).compression(compression).build()
}

// --- Id recovery ---

#[test]
fn sparse_ids_recovered_from_deltas() {
    for format in [5u8, 6, 7] {
        let body = TableBuilder::new(format)
            .files(vec![TestFile::new(2), TestFile::new(5), TestFile::new(5000)])
            .build();

        let table = decode_reference_table(&wrap(&body, 2), None).unwrap();
        assert_eq!(table.file_ids().collect::<Vec<_>>(), vec![2, 5, 5000]);
    }
}

#[test]
fn explicit_delta_bytes() {
    // V6, version 0, no options, deltas [2, 3, 4995]
    let mut body = vec![6, 0, 0, 0, 0, 0, 0, 3];
    for delta in [2u16, 3, 4995] {
        body.extend_from_slice(&delta.to_be_bytes());
    }
    body.extend_from_slice(&[0; 12]); // crcs
    body.extend_from_slice(&[0; 12]); // versions
    for _ in 0..3 {
        body.extend_from_slice(&1u16.to_be_bytes()); // entry counts
    }
    body.extend_from_slice(&[0; 6]); // entry id deltas

    let table = ReferenceTable::parse(&body).unwrap();
    assert_eq!(table.file_ids().collect::<Vec<_>>(), vec![2, 5, 5000]);
}

#[test]
fn duplicate_ids_are_malformed() {
    let mut body = vec![5, 0, 0, 2, 0, 4, 0, 0];
    body.extend_from_slice(&[0; 8]); // crcs
    body.extend_from_slice(&[0; 8]); // versions
    body.extend_from_slice(&[0, 1, 0, 1, 0, 0, 0, 0]); // entry counts and ids

    assert!(matches!(
        ReferenceTable::parse(&body),
        Err(DecodeError::MalformedTable(_))
    ));
}

#[test]
fn unknown_format_is_malformed() {
    let body = [4, 0, 0, 0];
    assert!(matches!(
        decode_reference_table(&wrap(&body, 0), None),
        Err(DecodeError::MalformedTable(_))
    ));
}

// --- Determinism ---

#[test]
fn decoding_twice_yields_identical_tables() {
    let body = TableBuilder::new(7)
        .version(1_650_000_000)
        .options(TableOptions::IDENTIFIERS | TableOptions::SIZES | TableOptions::WHIRLPOOL_DIGESTS)
        .files(vec![
            TestFile::new(0).identifier(11).crc(1).version(3).sizes(40, 90).entries(&[0, 1]),
            TestFile::new(70_000).identifier(-4).crc(2).version(4).sizes(41, 91),
        ])
        .build();
    let raw = wrap(&body, 1);

    let first = decode_reference_table(&raw, None).unwrap();
    let second = decode_reference_table(&raw, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.format, TableFormat::V7);
    assert_eq!(first.version_timestamp(), Some(1_650_000_000));
}

// --- Encrypted tables ---

#[test]
fn encrypted_table_decodes_with_key() {
    let key = XteaKey::from_words([9, 8, 7, 6]);
    let body = TableBuilder::new(6)
        .version(77)
        .files(vec![TestFile::new(1).crc(0xABCD), TestFile::new(3)])
        .build();
    let raw = ContainerBuilder::new(&body)
        .compression(2)
        .encrypt(key)
        .build();

    let table = decode_reference_table(&raw, Some(&key)).unwrap();
    assert_eq!(table.version, Some(77));
    assert_eq!(table.file(1).unwrap().crc, Some(0xABCD));
    assert!(decode_reference_table(&raw, None).is_err());
}

// --- Table metadata drives file decoding ---

#[test]
fn table_metadata_decodes_files() {
    let entries = vec![b"north".to_vec(), b"south".to_vec()];
    let file_raw = ContainerBuilder::new(&encode_entries(&entries, 1))
        .compression(2)
        .build();
    let compressed_size = u32::from_be_bytes(file_raw[1..5].try_into().unwrap());
    let uncompressed_size = encode_entries(&entries, 1).len() as u32;

    let body = TableBuilder::new(6)
        .options(TableOptions::SIZES)
        .files(vec![
            TestFile::new(12)
                .version(1_700_000_000)
                .crc(runecache_crypto::crc32(&file_raw))
                .sizes(compressed_size, uncompressed_size)
                .entries(&[3, 8]),
        ])
        .build();
    let table = decode_reference_table(&wrap(&body, 0), None).unwrap();

    let metadata: &FileMetadata = table.file(12).unwrap();
    let file = decode_file(&file_raw, metadata).unwrap();
    assert_eq!(file.entry(3).unwrap(), b"north");
    assert_eq!(file.entry(8).unwrap(), b"south");
    assert_eq!(file.info.version, Some(1_700_000_000));
    assert_eq!(file.info.version_timestamp(), Some(1_700_000_000));
    assert!(runecache_formats::verify_file(&file_raw, metadata).unwrap().is_valid());
}

#[test]
fn single_entry_files_have_no_trailer() {
    let body = TableBuilder::new(6).files(vec![TestFile::new(0)]).build();
    let table = decode_reference_table(&wrap(&body, 0), None).unwrap();

    let file_raw = ContainerBuilder::new(b"just the payload").build();
    let file = decode_file(&file_raw, table.file(0).unwrap()).unwrap();
    assert_eq!(file.data, b"just the payload");
    assert_eq!(file.entry(0).unwrap(), b"just the payload");
}

proptest! {
    #[test]
    fn arbitrary_id_sets_round_trip(
        ids in prop::collection::btree_set(0u32..2_000_000, 0..64),
        format in 5u8..=7
    ) {
        // u16 deltas cannot express large gaps before format 7
        let ids: Vec<u32> = if format < 7 {
            ids.into_iter().filter(|&id| id < 0x8000).collect()
        } else {
            ids.into_iter().collect()
        };

        let body = TableBuilder::new(format)
            .files(ids.iter().map(|&id| TestFile::new(id)).collect())
            .build();
        let table = ReferenceTable::parse(&body).unwrap();
        prop_assert_eq!(table.file_ids().collect::<Vec<_>>(), ids);
    }
}
