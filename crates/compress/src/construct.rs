use crate::Compression;

const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
#[cfg(feature = "zstd")]
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

impl Compression {
    /// Detect compression from a resource identifier's suffix.
    ///
    /// Accepts plain paths as well as URLs; any query string or fragment is
    /// ignored, and only the final path segment is inspected.
    ///
    /// ```
    /// use vellum_compress::Compression;
    ///
    /// assert_eq!(Compression::from_resource("texts/en/web.txt"), Compression::None);
    /// assert_eq!(Compression::from_resource("https://example.org/texts/de/luther.gz?v=2"), Compression::Gzip);
    /// ```
    #[must_use]
    pub fn from_resource(resource: &str) -> Self {
        let end = resource.find(['?', '#']).unwrap_or(resource.len());
        let path = &resource[..end];
        let segment = path.rsplit('/').next().unwrap_or(path);
        match segment.rsplit_once('.') {
            // A leading dot is a hidden file, not an extension.
            Some((stem, ext)) if !stem.is_empty() => match ext.to_ascii_lowercase().as_str() {
                "bz2" => Compression::Bzip2,
                "gz" => Compression::Gzip,
                #[cfg(feature = "zstd")]
                "zst" => Compression::Zstd,
                _ => Compression::None,
            },
            _ => Compression::None,
        }
    }

    /// Detect compression format from magic bytes.
    ///
    /// Returns `None` variant if no magic bytes match or if the input
    /// is too short to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&BZIP2_MAGIC) {
            return Compression::Bzip2;
        }
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        #[cfg(feature = "zstd")]
        if bytes.starts_with(&ZSTD_MAGIC) {
            return Compression::Zstd;
        }
        Compression::None
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case("texts/en/web.txt", Compression::None)]
    #[case("texts/en/web", Compression::None)]
    #[case("texts/.gz", Compression::None)]
    #[case("texts/en.d/web", Compression::None)]
    #[case("web.gz", Compression::Gzip)]
    #[case("web.txt.bz2", Compression::Bzip2)]
    #[case("texts/de/luther_1912.bz2", Compression::Bzip2)]
    #[case("https://example.org/texts/en/web.GZ", Compression::Gzip)]
    #[case("https://example.org/texts/en/web.gz?cache=0#top", Compression::Gzip)]
    #[case("https://example.org/web.gz.d/", Compression::None)]
    #[cfg_attr(feature = "zstd", case("texts/en/web.zst", Compression::Zstd))]
    #[cfg_attr(feature = "zstd", case("https://cdn.example.org/texts/de/luther_1912.zst?v=3", Compression::Zstd))]
    fn test_from_resource(#[case] test: &str, #[case] expected: Compression) {
        assert_eq!(Compression::from_resource(test), expected);
    }

    #[rstest]
    #[case(b"Genesis 1:1", Compression::None)]
    #[case(b"", Compression::None)]
    #[case(&[0x42, 0x5A, 0x68, 0x39], Compression::Bzip2)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], Compression::Gzip)]
    #[cfg_attr(feature = "zstd", case(&[0x28, 0xB5, 0x2F, 0xFD], Compression::Zstd))]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Compression) {
        assert_eq!(Compression::from_magic_bytes(bytes), expected);
    }
}
