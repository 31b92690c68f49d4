//! Multi-entry payload encoding

/// Lay out `entries` over `chunks` chunks and append the entry trailer.
///
/// Each entry is cut into `chunks` pieces of equal length, the last piece
/// taking the remainder.
pub fn encode_entries(entries: &[Vec<u8>], chunks: u8) -> Vec<u8> {
    assert!(chunks > 0, "at least one chunk");
    let chunk_count = usize::from(chunks);

    let pieces: Vec<Vec<&[u8]>> = entries
        .iter()
        .map(|entry| {
            let base = entry.len() / chunk_count;
            (0..chunk_count)
                .map(|chunk| {
                    let start = chunk * base;
                    let end = if chunk + 1 == chunk_count {
                        entry.len()
                    } else {
                        start + base
                    };
                    &entry[start..end]
                })
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    for chunk in 0..chunk_count {
        for entry in &pieces {
            out.extend_from_slice(entry[chunk]);
        }
    }

    for chunk in 0..chunk_count {
        let mut previous = 0i32;
        for entry in &pieces {
            let length = i32::try_from(entry[chunk].len()).unwrap();
            out.extend_from_slice(&(length - previous).to_be_bytes());
            previous = length;
        }
    }

    out.push(chunks);
    out
}
