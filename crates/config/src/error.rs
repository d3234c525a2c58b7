//! Config Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration source could not be read or parsed.
    #[display("could not load configuration")]
    Load,
    /// A value was read but is not acceptable; names the offending field.
    #[display("invalid configuration value: {_0}")]
    Invalid(#[error(not(source))] String),
}

impl ErrorKind {
    pub(crate) fn invalid(field: impl Into<String>) -> Self {
        ErrorKind::Invalid(field.into())
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
