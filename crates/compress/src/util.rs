use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Compression {
    /// Short name, used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    /// Whether `bytes` look like this format.
    ///
    /// Used to cross-check a format detected from a resource suffix against the
    /// bytes actually received. Plain text matches [`Compression::None`] only
    /// when it does not start with another format's magic bytes.
    #[must_use]
    pub fn check_magic_bytes(&self, bytes: &[u8]) -> bool {
        Self::from_magic_bytes(bytes) == *self
    }
}
