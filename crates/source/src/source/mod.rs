//! Source trait and implementations.
//!
//! A [`Source`] retrieves the raw bytes of a corpus resource. Decompression
//! and text decoding happen one layer up, in [`fetch_text`](crate::fetch_text),
//! so every source only has to move bytes.

#[cfg(feature = "http")]
mod http;
mod local;
#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "http")]
pub use self::http::HttpSource;
pub use self::local::LocalSource;
#[cfg(feature = "mock")]
pub use self::mock::MockSource;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for corpus sources.
///
/// Resource identifiers are relative paths (for example
/// `texts/de/luther_1912.zst`) resolved against the source's root. They are
/// validated with [`validate_resource`](crate::validate_resource) before use.
///
/// # Examples
///
/// ```
/// use vellum_source::{Source, error::Result};
///
/// async fn size_of_corpus(source: &dyn Source) -> Result<usize> {
///     Ok(source.fetch("texts/en/web.zst").await?.len())
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Retrieve the raw bytes of a resource.
    ///
    /// No retries happen here. A non-success response is
    /// [`Fetch`](crate::error::ErrorKind::Fetch); a missing local resource is
    /// [`NotFound`](crate::error::ErrorKind::NotFound).
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>>;
}
