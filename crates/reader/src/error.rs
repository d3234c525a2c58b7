//! Reader Error Types
//!
//! Every pipeline run either returns a complete result or one of these. The
//! underlying source or cache error is kept as a child in the error tree.

use derive_more::{Display, Error};
use vellum_cache::error::Error as CacheError;
use vellum_source::error::Error as SourceError;

/// A reader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching or decoding the corpus failed.
    #[display("could not load corpus text")]
    Source { retryable: bool },
    /// The cache could not be opened, read or written on a primary path.
    #[display("cache operation failed")]
    Cache { retryable: bool },
    #[display("unknown language: {_0}")]
    UnknownLanguage(#[error(not(source))] String),
    #[display("unknown book: {_0}")]
    UnknownBook(#[error(not(source))] String),
}

impl ErrorKind {
    /// Wrap a source error, keeping it as a child and inheriting whether a
    /// retry could help.
    #[track_caller]
    pub fn source(err: SourceError) -> Error {
        let retryable = err.is_retryable();
        err.raise(ErrorKind::Source { retryable })
    }

    /// Wrap a cache error the same way as [`ErrorKind::source`].
    #[track_caller]
    pub fn cache(err: CacheError) -> Error {
        let retryable = err.is_retryable();
        err.raise(ErrorKind::Cache { retryable })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Source { retryable } | Self::Cache { retryable } => *retryable,
            Self::UnknownLanguage(_) | Self::UnknownBook(_) => false,
        }
    }
}
