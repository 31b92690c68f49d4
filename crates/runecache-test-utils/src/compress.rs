//! Reference compressors producing payloads in their stored form

use std::io::Write;

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;

/// Bzip2 with the `BZh1` magic stripped
pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::new(1));
    encoder.write_all(data).unwrap();
    let stream = encoder.finish().unwrap();
    assert_eq!(&stream[..4], b"BZh1");
    stream[4..].to_vec()
}

/// Complete gzip member
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// LZMA properties followed by the raw stream, without the size field
pub fn lzma(data: &[u8]) -> Vec<u8> {
    let mut stream = Vec::new();
    lzma_rs::lzma_compress(&mut &data[..], &mut stream).unwrap();
    let mut stored = stream[..5].to_vec();
    stored.extend_from_slice(&stream[13..]);
    stored
}

/// Compress `data` with the codec named by container tag `tag`
///
/// Unknown tags return the data unchanged.
pub fn by_tag(tag: u8, data: &[u8]) -> Vec<u8> {
    match tag {
        1 => bzip2(data),
        2 => gzip(data),
        3 => lzma(data),
        _ => data.to_vec(),
    }
}
