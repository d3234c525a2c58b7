//! Book naming rules: how a source-level book name maps to a logical book.

use crate::consts;
use crate::error::ErrorKind;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Maps source-level book names (as written in a corpus line) to logical
/// book names (used for navigation and progress).
pub trait NamingRule {
    /// The logical book `source` belongs to. Must return `source` itself when
    /// the name does not follow the rule's convention.
    fn logical_name<'a>(&self, source: &'a str) -> &'a str;

    /// Whether books parsed under this rule should be consolidated.
    fn consolidates(&self) -> bool;
}

/// The built-in naming conventions.
///
/// ```
/// use vellum_corpus::{BookNaming, NamingRule};
///
/// assert_eq!(BookNaming::NumberedPrefix.logical_name("2 Mose"), "Mose");
/// assert_eq!(BookNaming::NumberedPrefix.logical_name("Genesis"), "Genesis");
/// assert_eq!(BookNaming::Identity.logical_name("2 Mose"), "2 Mose");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BookNaming {
    /// Every source-level book is its own logical book.
    #[default]
    Identity,
    /// `"<number> <name>"` belongs to logical book `"<name>"`, as in German
    /// translations that split "Mose" into "1 Mose" through "5 Mose".
    NumberedPrefix,
}

impl BookNaming {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookNaming::Identity => "identity",
            BookNaming::NumberedPrefix => "numbered-prefix",
        }
    }
}

impl NamingRule for BookNaming {
    fn logical_name<'a>(&self, source: &'a str) -> &'a str {
        match self {
            BookNaming::Identity => source,
            BookNaming::NumberedPrefix => consts::NUMBERED_BOOK_REGEX
                .captures(source)
                .and_then(|captures| captures.get(1))
                .map_or(source, |base| base.as_str()),
        }
    }

    fn consolidates(&self) -> bool {
        matches!(self, BookNaming::NumberedPrefix)
    }
}

impl<R: NamingRule + ?Sized> NamingRule for &R {
    fn logical_name<'a>(&self, source: &'a str) -> &'a str {
        (**self).logical_name(source)
    }

    fn consolidates(&self) -> bool {
        (**self).consolidates()
    }
}

impl Display for BookNaming {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookNaming {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(BookNaming::Identity),
            "numbered-prefix" | "numbered" => Ok(BookNaming::NumberedPrefix),
            other => exn::bail!(ErrorKind::UnknownNaming(other.to_string())),
        }
    }
}
