//! Cache Error Types
//!
//! Open and per-operation failures propagate to the caller. Maintenance
//! failures inside [`Cache::set_book`](crate::Cache::set_book) are logged and
//! never reach it.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing store could not be opened or created.
    #[display("could not open cache database")]
    Open,
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A payload could not be (de)serialized, or a stored value is out of range.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// SQLite reports lock contention as a generic database error, so those
    /// are worth another attempt; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Database)
    }
}
