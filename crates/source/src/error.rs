//! Source Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use vellum_compress::error::{Error as CompressionError, ErrorKind as CompressionErrorKind};

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Nothing at this layer retries; that decision belongs to the caller.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The transport answered, but with a non-success status.
    #[display("fetch failed for {resource}: HTTP {status}")]
    Fetch { resource: String, status: u16 },
    /// The transport itself failed (connection refused, timeout, TLS...).
    #[display("transport error while fetching {_0}")]
    Transport(#[error(not(source))] String),
    /// Resource does not exist (local and in-memory sources).
    #[display("resource not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Resource identifier escapes the source root or is otherwise unusable.
    #[display("invalid resource: {_0}")]
    InvalidResource(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The resource was expected to be compressed but could not be decoded.
    #[display("decompression failed: {_0}")]
    Decompression(CompressionErrorKind),
    /// The resource (after any decompression) is not UTF-8 text.
    #[display("resource is not valid UTF-8 text")]
    Encoding,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Convert a compression error into a source error, preserving the
    /// compress crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn decompression(err: CompressionError) -> Error {
        let inner = (*err).clone();
        match inner {
            CompressionErrorKind::InvalidText => err.raise(ErrorKind::Encoding),
            _ => err.raise(ErrorKind::Decompression(inner)),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) | Self::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(404, false)]
    #[case(403, false)]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    fn test_fetch_retryable(#[case] status: u16, #[case] expected: bool) {
        let kind = ErrorKind::Fetch { resource: "texts/en/web.zst".to_string(), status };
        assert_eq!(kind.is_retryable(), expected);
    }

    #[test]
    fn test_display() {
        let kind = ErrorKind::Fetch { resource: "web.zst".to_string(), status: 404 };
        assert_eq!(kind.to_string(), "fetch failed for web.zst: HTTP 404");
        assert!(!ErrorKind::Decompression(CompressionErrorKind::InvalidData).is_retryable());
    }

    #[test]
    fn test_decompression_maps_text_errors_to_encoding() {
        let err = CompressionError::from(CompressionErrorKind::InvalidText);
        assert!(matches!(&*ErrorKind::decompression(err), ErrorKind::Encoding));
        let err = CompressionError::from(CompressionErrorKind::InvalidData);
        assert!(matches!(
            &*ErrorKind::decompression(err),
            ErrorKind::Decompression(CompressionErrorKind::InvalidData)
        ));
    }
}
