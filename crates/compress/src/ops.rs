//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use bzip2::{Compression as BzCompression, read::BzDecoder, write::BzEncoder};
use exn::ResultExt;
use flate2::{Compression as GzCompression, read::GzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;
#[cfg(feature = "zstd")]
use zstd::stream::read::Decoder as ZstdDecoder;

// Corpora are compressed once at publish time and decompressed on every
// cache miss, so favour ratio when encoding.
const BZIP2_LEVEL: BzCompression = BzCompression::best();
const GZIP_LEVEL: GzCompression = GzCompression::best();
#[cfg(feature = "zstd")]
const ZSTD_LEVEL: i32 = 19;
const BYTE_ORDER_MARK: char = '\u{feff}';

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum_compress::Compression;
    ///
    /// let data = b"Genesis 1:1 In the beginning God created the heaven and the earth.";
    /// let compressed = Compression::Gzip.compress(data).unwrap();
    /// assert_ne!(compressed.as_slice(), data.as_slice());
    /// ```
    #[instrument(skip(input), fields(format = %self, input_size = input.len(), output_size))]
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let output = match self {
            Compression::None => input.to_vec(),
            Compression::Bzip2 => {
                let mut encoder = BzEncoder::new(Vec::new(), BZIP2_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?
            },
            #[cfg(feature = "zstd")]
            Compression::Zstd => zstd::encode_all(input, ZSTD_LEVEL).or_raise(|| ErrorKind::Io)?,
        };
        tracing::Span::current().record("output_size", output.len());
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vellum_compress::Compression;
    ///
    /// let original = b"Genesis 1:1 In the beginning";
    /// let compressed = Compression::Bzip2.compress(original).unwrap();
    /// let decompressed = Compression::Bzip2.decompress(&compressed).unwrap();
    /// assert_eq!(decompressed, original);
    /// ```
    #[instrument(skip(input), fields(format = %self, input_size = input.len(), output_size))]
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        // Plain text compresses roughly fourfold with any of these formats.
        let mut output = Vec::with_capacity(input.len().saturating_mul(4));
        match self {
            Compression::None => output.extend_from_slice(input),
            Compression::Bzip2 => {
                BzDecoder::new(input).read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
            },
            Compression::Gzip => {
                GzDecoder::new(input).read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
            },
            #[cfg(feature = "zstd")]
            Compression::Zstd => {
                let mut decoder = ZstdDecoder::new(input).or_raise(|| ErrorKind::Codec)?;
                decoder.read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
            },
        }
        tracing::Span::current().record("output_size", output.len());
        Ok(output)
    }

    /// Decompress a byte slice and decode the result as UTF-8 text.
    ///
    /// Fails with [`ErrorKind::InvalidData`] when the compressed stream is
    /// corrupt, and with [`ErrorKind::InvalidText`] when the decompressed bytes
    /// are not UTF-8. A leading byte-order mark is dropped.
    ///
    /// ```rust
    /// use vellum_compress::Compression;
    ///
    /// let compressed = Compression::Gzip.compress("1 Mose 1:1 Am Anfang".as_bytes()).unwrap();
    /// assert_eq!(Compression::Gzip.decompress_text(&compressed).unwrap(), "1 Mose 1:1 Am Anfang");
    /// ```
    pub fn decompress_text(&self, input: &[u8]) -> Result<String> {
        decode_text(self.decompress(input)?)
    }
}

/// Decode bytes as UTF-8 text, dropping a leading byte-order mark.
///
/// Fails with [`ErrorKind::InvalidText`] when the bytes are not UTF-8.
///
/// ```rust
/// use vellum_compress::decode_text;
///
/// let text = decode_text("\u{feff}Genesis 1:1 In the beginning".as_bytes().to_vec()).unwrap();
/// assert_eq!(text, "Genesis 1:1 In the beginning");
/// ```
pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    let mut text = String::from_utf8(bytes).or_raise(|| ErrorKind::InvalidText)?;
    if text.starts_with(BYTE_ORDER_MARK) {
        text.drain(..BYTE_ORDER_MARK.len_utf8());
    }
    Ok(text)
}
