//! Corpus Error Types
//!
//! Parsing itself never fails: malformed lines are skipped and reported in a
//! [`ParseReport`](crate::ParseReport). Errors here only cover configuration
//! of the parser, such as unknown book-naming rules.

use derive_more::{Display, Error};

/// A corpus error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named book-naming rule does not exist.
    #[display("unknown book naming rule: {_0}")]
    UnknownNaming(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
