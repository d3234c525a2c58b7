//! Fetch adapters for corpus resources.
//!
//! A [`Source`] moves bytes; [`fetch_text`] turns those bytes into UTF-8 text,
//! decompressing first when the resource name carries a recognised
//! compression suffix (see [`Compression::from_resource`]).

pub mod error;
mod resource;
mod source;

#[cfg(feature = "http")]
pub use crate::source::HttpSource;
pub use crate::source::LocalSource;
#[cfg(feature = "mock")]
pub use crate::source::MockSource;
pub use crate::resource::validate as validate_resource;
pub use crate::source::Source;
use crate::error::{ErrorKind, Result};
use std::sync::Arc;
use tracing::instrument;
use vellum_compress::Compression;

pub type SourceHandle = Arc<dyn Source + Send + Sync>;

/// Fetch a resource and decode it as UTF-8 text.
///
/// Resources whose name ends in a compression suffix are decompressed before
/// decoding; everything else is decoded directly. Either way a leading
/// byte-order mark is dropped. Errors are returned as-is with no retry.
///
/// # Examples
///
/// ```no_run
/// use vellum_source::{LocalSource, fetch_text};
///
/// # async fn example() -> vellum_source::error::Result<()> {
/// let source = LocalSource::new("local", "/srv/vellum")?;
/// let text = fetch_text(&source, "texts/en/web.zst").await?;
/// # Ok(())
/// # }
/// ```
#[instrument(skip(source), fields(source = source.name(), compression, size))]
pub async fn fetch_text(source: &(dyn Source + Send + Sync), resource: &str) -> Result<String> {
    let compression = Compression::from_resource(resource);
    tracing::Span::current().record("compression", compression.as_str());
    let bytes = source.fetch(resource).await?;
    tracing::Span::current().record("size", bytes.len());
    if compression != Compression::None && !compression.check_magic_bytes(&bytes) {
        tracing::warn!(resource, %compression, "Resource suffix does not match its content");
    }
    let text = match compression {
        Compression::None => vellum_compress::decode_text(bytes),
        _ => compression.decompress_text(&bytes),
    }
    .map_err(ErrorKind::decompression)?;
    Ok(text)
}
