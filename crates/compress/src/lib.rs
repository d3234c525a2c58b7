//! Compression detection and in-memory decompression for corpus resources.
//!
//! Corpora are usually shipped compressed (`web.zst`, `luther_1912.zst`) and
//! occasionally as plain text. This crate wraps the supported compression
//! libraries behind a single [`Compression`] enum, providing:
//!
//! - **Format detection** from resource names, including URLs
//!   ([`Compression::from_resource`]), or from magic bytes
//!   ([`Compression::from_magic_bytes`])
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`])
//! - **Text decoding** with byte-order mark removal ([`decode_text`],
//!   [`Compression::decompress_text`])
//!
//! Bzip2 and Gzip are always available. Zstd is behind the default-on `zstd`
//! feature.

mod construct;
pub mod error;
mod ops;
mod util;

pub use crate::ops::decode_text;

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// Gzip compression (.gz)
    Gzip,
    /// Zstd compression (.zst)
    #[cfg(feature = "zstd")]
    Zstd,
}
