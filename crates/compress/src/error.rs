//! Compression Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An encoder or decoder could not be set up.
    #[display("could not initialise codec")]
    Codec,
    /// Data is corrupt or malformed. Don't retry with the same input.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// Decompressed data is not valid UTF-8 text.
    #[display("decompressed data is not valid UTF-8")]
    InvalidText,
    /// Writing compressed output failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidData.to_string(), "invalid or corrupted data");
        assert_eq!(ErrorKind::InvalidText.to_string(), "decompressed data is not valid UTF-8");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::InvalidData.is_retryable());
        assert!(!ErrorKind::InvalidText.is_retryable());
        assert!(ErrorKind::Io.is_retryable());
    }
}
