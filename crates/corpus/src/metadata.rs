use crate::models::{BookMetadata, Metadata, book_mut};
use crate::naming::NamingRule;
use crate::parse::verse_lines;
use tracing::instrument;

/// Scan a corpus for navigation data without keeping any verse text.
///
/// Tracks the highest chapter per book and the highest verse per chapter.
/// Source books are then keyed by their logical name with a plain overwrite:
/// when several source books share a logical name, the one that appears
/// last in the corpus wins outright. Chapter counts for multi-part books are
/// therefore approximate until the full corpus is parsed and consolidated.
#[instrument(skip_all, fields(text_size = text.len(), books))]
pub fn extract_metadata<R: NamingRule + ?Sized>(text: &str, rule: &R) -> Metadata {
    let mut per_source = Metadata::new();
    for line in verse_lines(text) {
        book_mut(&mut per_source, line.book).observe(line.chapter, line.verse);
    }

    let mut metadata = Metadata::new();
    for (source, book) in per_source {
        metadata.insert(rule.logical_name(&source).to_string(), book);
    }
    tracing::Span::current().record("books", metadata.len());
    metadata
}

/// Metadata for a single book, if the corpus contains it under that exact name.
pub fn book_metadata<R: NamingRule + ?Sized>(text: &str, book: &str, rule: &R) -> Option<BookMetadata> {
    extract_metadata(text, rule).get(book).cloned()
}
