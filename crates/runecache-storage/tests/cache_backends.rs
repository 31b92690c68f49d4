#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for reading caches through every backend
//!
//! The same cache contents are written as a flat tree and as a disk cache,
//! then read back through `StorageConfig` and `Cache`.

use std::path::Path;

use pretty_assertions::assert_eq;
use runecache_crypto::{NoKeys, XteaKey};
use runecache_storage::{BackendKind, Cache, CacheStorage, Dat2Storage, StorageConfig};
use runecache_test_utils::container::ContainerBuilder;
use runecache_test_utils::disk::DiskCacheBuilder;
use runecache_test_utils::group::encode_entries;
use runecache_test_utils::require_cache_data;
use runecache_test_utils::table::{TableBuilder, TestFile};

const MAP_KEY: XteaKey = XteaKey::from_words([0x1111, 0x2222, 0x3333, 0x4444]);

/// `(index, file, raw container)` for a small two-index cache
fn cache_contents() -> Vec<(u8, u32, Vec<u8>)> {
    let configs = encode_entries(&[b"npc".to_vec(), b"item".to_vec(), b"obj".to_vec()], 1);
    let large: Vec<u8> = (0..5000u32).map(|i| (i % 97) as u8).collect();

    let config_table = TableBuilder::new(7)
        .version(1_690_000_000)
        .files(vec![
            TestFile::new(0).version(1).entries(&[0, 1, 2]),
            TestFile::new(70_000).version(2),
        ])
        .build();
    let map_table = TableBuilder::new(7)
        .files(vec![TestFile::new(3).version(9)])
        .build();

    vec![
        (255, 2, ContainerBuilder::new(&config_table).compression(2).build()),
        (255, 5, ContainerBuilder::new(&map_table).compression(1).build()),
        (2, 0, ContainerBuilder::new(&configs).compression(2).version(1).build()),
        (2, 70_000, ContainerBuilder::new(&large).compression(3).build()),
        (
            5,
            3,
            ContainerBuilder::new(b"terrain heights")
                .compression(2)
                .encrypt(MAP_KEY)
                .build(),
        ),
    ]
}

fn write_flat(root: &Path) {
    for (index, file, data) in cache_contents() {
        let dir = root.join(index.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file.to_string()), data).unwrap();
    }
}

fn write_dat2(root: &Path) {
    let builder = cache_contents()
        .into_iter()
        .fold(DiskCacheBuilder::new(), |builder, (index, file, data)| {
            builder.file(index, file, data)
        });
    builder.write_to(root).unwrap();
}

fn check_cache(storage: Box<dyn CacheStorage>, keys_path: &Path) {
    assert_eq!(storage.indexes().unwrap(), vec![2, 5]);

    let keys = StorageConfig::default()
        .with_key_file(Some(keys_path))
        .load_keys()
        .unwrap();
    let cache = Cache::new(storage, keys);

    let table = cache.reference_table(2).unwrap();
    assert_eq!(table.file_ids().collect::<Vec<_>>(), vec![0, 70_000]);
    assert_eq!(table.version_timestamp(), Some(1_690_000_000));

    let configs = cache.file(2, 0).unwrap();
    assert_eq!(configs.entry_count(), 3);
    assert_eq!(configs.entry(1).unwrap(), b"item");
    assert_eq!(configs.info.version, Some(1));

    let large = cache.file(2, 70_000).unwrap();
    assert_eq!(large.data.len(), 5000);
    assert_eq!(large.data[96], 96);

    let map = cache.file(5, 3).unwrap();
    assert_eq!(map.data, b"terrain heights");
}

fn write_keys(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("keys.txt");
    let [a, b, c, d] = MAP_KEY.words();
    std::fs::write(&path, format!("5 3 {a} {b} {c} {d}\n")).unwrap();
    path
}

#[test]
fn flat_backend_reads_cache() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_flat(temp_dir.path());
    let keys = write_keys(temp_dir.path());

    let storage = StorageConfig::new(temp_dir.path())
        .with_backend(BackendKind::Flat)
        .open_storage()
        .unwrap();
    check_cache(storage, &keys);
}

#[test]
fn dat2_backend_reads_cache() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_dat2(temp_dir.path());
    let keys = write_keys(temp_dir.path());

    let storage = StorageConfig::new(temp_dir.path())
        .with_backend(BackendKind::Dat2)
        .open_storage()
        .unwrap();
    check_cache(storage, &keys);
}

#[test]
fn backends_return_identical_bytes() {
    let flat_dir = tempfile::tempdir().unwrap();
    let dat2_dir = tempfile::tempdir().unwrap();
    write_flat(flat_dir.path());
    write_dat2(dat2_dir.path());

    let flat = StorageConfig::new(flat_dir.path())
        .with_backend(BackendKind::Flat)
        .open_storage()
        .unwrap();
    let dat2 = Dat2Storage::open(dat2_dir.path()).unwrap();

    for (index, file, data) in cache_contents() {
        assert_eq!(flat.read_file_bytes(index, file).unwrap(), data);
        assert_eq!(dat2.read_file_bytes(index, file).unwrap(), data);
    }
}

#[test]
fn cache_is_shareable_across_threads() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_dat2(temp_dir.path());
    let cache = Cache::new(Dat2Storage::open(temp_dir.path()).unwrap(), NoKeys);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let file = cache.file(2, 0).unwrap();
                assert_eq!(file.entry(2).unwrap(), b"obj");
            });
        }
    });
}

#[test]
fn real_cache_reference_tables_decode() {
    let path = require_cache_data!();
    let cache = Cache::new(Dat2Storage::open(&path).unwrap(), NoKeys);

    for index in cache.indexes().unwrap() {
        let table = cache.reference_table(index).unwrap();
        println!(
            "index {index}: format {}, {} files",
            table.format,
            table.len()
        );
    }
}
