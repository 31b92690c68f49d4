//! Decode error types

use thiserror::Error;

/// Errors raised while decoding containers and reference tables
///
/// Every variant is terminal for the call that raised it: no partial result
/// is returned alongside an error.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Fewer bytes were available than the encoding declares
    #[error("truncated data: {0}")]
    TruncatedData(String),

    /// A codec rejected its input stream, or a structural field is invalid
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// A declared length disagrees with the actual one
    #[error("{what} mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Which length was compared
        what: &'static str,
        /// Declared value
        expected: u64,
        /// Observed value
        actual: u64,
    },

    /// Unknown compression tag
    #[error("unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    /// Reference table fields are internally inconsistent
    #[error("malformed reference table: {0}")]
    MalformedTable(String),
}

impl DecodeError {
    /// Shorthand for [`DecodeError::SizeMismatch`]
    pub(crate) fn size_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            what,
            expected: expected as u64,
            actual: actual as u64,
        }
    }
}

impl From<binrw::Error> for DecodeError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::TruncatedData("unexpected end of input".to_string())
            }
            other => Self::CorruptData(other.to_string()),
        }
    }
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;
