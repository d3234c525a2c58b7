//! Extracting a single logical book without parsing the whole corpus into
//! memory.

use crate::consolidate::Offsets;
use crate::models::{Bible, Book, book_mut};
use crate::naming::NamingRule;
use crate::parse::verse_lines;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

/// How [`extract_book_with`] numbers chapters when a logical book spans
/// several source books.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectivePolicy {
    /// Keep source chapter numbers. Chapters of different source books that
    /// share a number collide, and the later line wins. Only correct for
    /// logical books made of a single source book.
    #[default]
    Literal,
    /// Renumber chapters exactly as [`consolidate`](crate::consolidate()) does,
    /// so the result equals the consolidated book from a full parse.
    Consolidated,
}

impl SelectivePolicy {
    /// Short name, used in cache keys and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectivePolicy::Literal => "literal",
            SelectivePolicy::Consolidated => "consolidated",
        }
    }
}

impl Display for SelectivePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Extract one logical book using [`SelectivePolicy::Literal`].
///
/// A line belongs to `target` when its source book name equals `target` or
/// maps to it under `rule`. Returns an empty [`Book`] when nothing matches.
pub fn extract_book<R: NamingRule + ?Sized>(text: &str, target: &str, rule: &R) -> Book {
    extract_book_with(text, target, rule, SelectivePolicy::Literal)
}

/// Extract one logical book with an explicit chapter numbering policy.
#[instrument(skip(text, rule), fields(text_size = text.len(), chapters))]
pub fn extract_book_with<R: NamingRule + ?Sized>(
    text: &str,
    target: &str,
    rule: &R,
    policy: SelectivePolicy,
) -> Book {
    let matches = |source: &str| source == target || rule.logical_name(source) == target;
    let book = match policy {
        SelectivePolicy::Literal => {
            let mut book = Book::new();
            for line in verse_lines(text).filter(|line| matches(line.book)) {
                book.insert_verse(line.chapter, line.verse, line.content);
            }
            book
        },
        SelectivePolicy::Consolidated => {
            // Group by source book first: offsets depend on each source
            // book's highest chapter, which is only known after the scan.
            let mut sources = Bible::new();
            for line in verse_lines(text).filter(|line| rule.logical_name(line.book) == target) {
                book_mut(&mut sources, line.book).insert_verse(line.chapter, line.verse, line.content);
            }
            let mut offsets = Offsets::default();
            let mut book = Book::new();
            for (source, chapters) in sources {
                offsets.append(target, &source, chapters, &mut book);
            }
            book
        },
    };
    tracing::Span::current().record("chapters", book.chapter_count());
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate;
    use crate::naming::BookNaming;
    use crate::parse::Parser;
    use rstest::rstest;

    const GERMAN: &str = "\
1 Mose 1:1 Am Anfang
1 Mose 2:1 Also ward vollendet
Hiob 1:1 Es war ein Mann
2 Mose 1:1 Dies sind die Namen
2 Mose 1:2 Ruben
2 Mose 3:1 Mose aber hütete";

    #[rstest]
    #[case(SelectivePolicy::Literal)]
    #[case(SelectivePolicy::Consolidated)]
    fn test_single_part_book(#[case] policy: SelectivePolicy) {
        let book = extract_book_with(GERMAN, "Hiob", &BookNaming::NumberedPrefix, policy);
        assert_eq!(book.chapter_count(), 1);
        assert_eq!(book.verse(1, 1), Some("Es war ein Mann"));
    }

    #[test]
    fn test_literal_collides_across_source_books() {
        let book = extract_book(GERMAN, "Mose", &BookNaming::NumberedPrefix);
        assert_eq!(book.chapters().map(|(n, _)| n).collect::<Vec<_>>(), [1, 2, 3]);
        // "2 Mose 1:1" overwrote "1 Mose 1:1".
        assert_eq!(book.verse(1, 1), Some("Dies sind die Namen"));
        assert_eq!(book.verse(1, 2), Some("Ruben"));
        assert_eq!(book.verse(2, 1), Some("Also ward vollendet"));
    }

    #[test]
    fn test_consolidated_matches_full_consolidation() {
        let rule = BookNaming::NumberedPrefix;
        let book = extract_book_with(GERMAN, "Mose", &rule, SelectivePolicy::Consolidated);
        let full = consolidate(Parser::new().parse(GERMAN), &rule);
        assert_eq!(Some(&book), full.get("Mose"));
        assert_eq!(book.verse(3, 1), Some("Dies sind die Namen"));
        assert_eq!(book.verse(5, 1), Some("Mose aber hütete"));
    }

    #[test]
    fn test_source_name_still_matches_literally() {
        let book = extract_book(GERMAN, "2 Mose", &BookNaming::NumberedPrefix);
        assert_eq!(book.verse_count(), 3);
        assert_eq!(book.verse(1, 1), Some("Dies sind die Namen"));
    }

    #[rstest]
    #[case("Exodus")]
    #[case("mose")]
    #[case("")]
    fn test_unknown_book_is_empty(#[case] target: &str) {
        assert!(extract_book(GERMAN, target, &BookNaming::NumberedPrefix).is_empty());
    }

    #[test]
    fn test_identity_rule_matches_exact_name_only() {
        assert!(extract_book(GERMAN, "Mose", &BookNaming::Identity).is_empty());
        assert_eq!(extract_book(GERMAN, "1 Mose", &BookNaming::Identity).chapter_count(), 2);
    }
}
