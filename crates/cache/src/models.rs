use crate::error::{Error, ErrorKind};
use derive_more::Display;
use exn::ResultExt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Key namespace inside the cache.
///
/// Keys only need to be unique within a partition, and eviction only ever
/// touches [`Partition::Book`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Full parsed corpora, one per language.
    #[display("bible")]
    Bible,
    /// Single extracted books.
    #[display("book")]
    Book,
    /// Navigation metadata, one per language.
    #[display("metadata")]
    Metadata,
    /// Reading progress, one per language.
    #[display("progress")]
    Progress,
}

impl Partition {
    pub const ALL: [Partition; 4] = [Partition::Bible, Partition::Book, Partition::Metadata, Partition::Progress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Bible => "bible",
            Partition::Book => "book",
            Partition::Metadata => "metadata",
            Partition::Progress => "progress",
        }
    }
}

impl FromStr for Partition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Partition::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::from(ErrorKind::InvalidData("partition")))
    }
}

/// Estimated storage footprint in bytes.
///
/// Computed as serialized characters times a per-character multiplier, so
/// it approximates, not measures, what the store occupies on disk.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("~{_0} bytes")]
pub struct SizeEstimate(pub u64);

impl SizeEstimate {
    pub fn from_chars(chars: u64, bytes_per_char: u64) -> Self {
        Self(chars.saturating_mul(bytes_per_char))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }
}

/// Outcome of a size-limited write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    Written,
    /// The value exceeded the per-entry cap and was not cached.
    Skipped(SizeEstimate),
}

/// A stored entry, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    /// Write time for timestamped entries.
    pub created_at: Option<OffsetDateTime>,
    pub size: SizeEstimate,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EntryRow {
    pub(crate) key: String,
    pub(crate) created_at: Option<i64>,
    pub(crate) chars: i64,
}

impl EntryRow {
    pub(crate) fn into_info(self, bytes_per_char: u64) -> Result<EntryInfo, Error> {
        let created_at = self
            .created_at
            .map(|millis| OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000))
            .transpose()
            .or_raise(|| ErrorKind::InvalidData("timestamp"))?;
        let chars = u64::try_from(self.chars).or_raise(|| ErrorKind::InvalidData("payload length"))?;
        Ok(EntryInfo {
            key: self.key,
            created_at,
            size: SizeEstimate::from_chars(chars, bytes_per_char),
        })
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bible", Partition::Bible)]
    #[case("Book", Partition::Book)]
    #[case(" metadata ", Partition::Metadata)]
    #[case("PROGRESS", Partition::Progress)]
    fn test_partition_from_str(#[case] input: &str, #[case] expected: Partition) {
        assert_eq!(input.parse::<Partition>().unwrap(), expected);
    }

    #[test]
    fn test_partition_display_matches_as_str() {
        for partition in Partition::ALL {
            assert_eq!(partition.to_string(), partition.as_str());
        }
        assert!("books".parse::<Partition>().is_err());
    }

    #[test]
    fn test_size_estimate() {
        assert_eq!(SizeEstimate::from_chars(10, 2).bytes(), 20);
        assert_eq!(SizeEstimate::from_chars(u64::MAX, 2).bytes(), u64::MAX);
        assert_eq!(SizeEstimate(42).to_string(), "~42 bytes");
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-09-13T12:26:40Z
        assert!(now_millis() > 1_600_000_000_000);
    }
}
