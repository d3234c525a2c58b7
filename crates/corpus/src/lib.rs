//! Line-oriented corpus parsing.
//!
//! A corpus is one verse per line, `<book> <chapter>:<verse> <content>`. This
//! crate turns such text into a nested book → chapter → verse structure
//! ([`Bible`]) and provides the passes built on top of it:
//!
//! - **Parsing** ([`parse`], [`Parser`]) is lenient: lines that don't match
//!   are skipped, optionally recorded in a [`ParseReport`].
//! - **Naming rules** ([`NamingRule`], [`BookNaming`]) map source-level book
//!   names such as "1 Mose" to logical books such as "Mose".
//! - **Consolidation** ([`consolidate`]) merges the source books of a logical
//!   book with continuous chapter numbering.
//! - **Metadata** ([`extract_metadata`]) gathers chapter and verse counts
//!   without keeping verse text.
//! - **Selective extraction** ([`extract_book`], [`extract_book_with`]) pulls
//!   one logical book out of a corpus.
//!
//! Everything here is synchronous and depends only on its input.
//!
//! ```
//! use vellum_corpus::{BookNaming, MetadataExt, consolidate, extract_metadata, parse};
//!
//! let text = "1 Mose 1:1 Am Anfang\n1 Mose 2:1 Also ward\n2 Mose 1:1 Dies sind";
//! let bible = consolidate(parse(text), &BookNaming::NumberedPrefix);
//! assert_eq!(bible.get("Mose").unwrap().chapter_count(), 3);
//!
//! let metadata = extract_metadata(text, &BookNaming::NumberedPrefix);
//! assert_eq!(metadata.chapter_counts(), [("Mose", 1)]);
//! ```

mod consolidate;
mod consts;
pub mod error;
mod metadata;
pub mod models;
mod naming;
mod parse;
mod select;

pub use crate::consolidate::consolidate;
pub use crate::metadata::{book_metadata, extract_metadata};
pub use crate::models::{Bible, BibleExt, Book, BookMetadata, Chapter, Metadata, MetadataExt};
pub use crate::naming::{BookNaming, NamingRule};
pub use crate::parse::{
    DEFAULT_SAMPLE_LIMIT, ParseReport, Parser, SkipReason, SkippedLine, VerseLine, parse_line, verse_lines,
};
pub use crate::select::{SelectivePolicy, extract_book, extract_book_with};

/// Parse a corpus with the default [`Parser`].
pub fn parse(text: &str) -> Bible {
    Parser::default().parse(text)
}

/// Parse a corpus with the default [`Parser`], reporting skipped lines.
pub fn parse_with_report(text: &str) -> (Bible, ParseReport) {
    Parser::default().parse_with_report(text)
}
