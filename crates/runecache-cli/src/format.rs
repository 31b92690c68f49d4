//! Text formatting helpers for reports

use chrono::DateTime;
use runecache_formats::reference_table::version_timestamp;

/// Group digits in threes: `1234567` becomes `1,234,567`
pub fn thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Version number, followed by its UTC time when it is a timestamp
pub fn version(version: Option<u32>) -> String {
    let Some(number) = version else {
        return "none".to_string();
    };

    match version_timestamp(version).and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        Some(time) => format!("{number} ({})", time.format("%Y-%m-%d %H:%M:%SZ")),
        None => number.to_string(),
    }
}

/// Uppercase hex without separators
pub fn hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Printable ASCII, with everything else shown as `.`
pub fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        })
        .collect()
}

/// `HEX (text)` rendering of a byte run
pub fn bytes(bytes: &[u8]) -> String {
    format!("{} ({})", hex(bytes), printable(bytes))
}

/// Comma separated list of ids
pub fn id_list(ids: impl IntoIterator<Item = u32>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
