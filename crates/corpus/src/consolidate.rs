//! Merging multi-part source books into logical books.

use crate::models::{Bible, Book, book_mut};
use crate::naming::NamingRule;
use std::collections::HashMap;
use tracing::instrument;

/// Running chapter offset per logical book.
#[derive(Debug, Default)]
pub(crate) struct Offsets(HashMap<String, u32>);

impl Offsets {
    /// Move the chapters of `source` into `target`, shifted by the current
    /// offset of `logical`, then advance that offset by the highest chapter
    /// number of `source` (not its chapter count, so gaps carry over).
    pub(crate) fn append(&mut self, logical: &str, source_name: &str, source: Book, target: &mut Book) {
        let offset = self.0.entry(logical.to_string()).or_insert(0);
        let highest = source.max_chapter().unwrap_or(0);
        for (chapter, verses) in source {
            match chapter.checked_add(*offset) {
                Some(renumbered) => {
                    target.insert_chapter(renumbered, verses);
                },
                None => tracing::warn!(
                    book = source_name,
                    chapter,
                    offset = *offset,
                    "Consolidated chapter number overflows, dropping chapter"
                ),
            }
        }
        *offset = offset.saturating_add(highest);
    }
}

/// Merge source-level books into their logical books.
///
/// Source books are visited in first-appearance order. Each one's chapters
/// are appended to its logical book in ascending order, renumbered by the
/// sum of the highest chapter numbers of the source books placed before it.
/// Logical books keep the position of their first source book. Under a rule
/// that maps every name to itself this is the identity.
///
/// ```
/// use vellum_corpus::{BookNaming, consolidate, parse};
///
/// let text = "1 Mose 1:1 a\n1 Mose 2:1 b\n2 Mose 1:1 c";
/// let bible = consolidate(parse(text), &BookNaming::NumberedPrefix);
/// assert_eq!(bible.get("Mose").unwrap().verse(3, 1), Some("c"));
/// ```
#[instrument(skip_all, fields(books = parsed.len(), logical_books))]
pub fn consolidate<R: NamingRule + ?Sized>(parsed: Bible, rule: &R) -> Bible {
    let mut offsets = Offsets::default();
    let mut merged = Bible::new();
    for (source, book) in parsed {
        let logical = rule.logical_name(&source);
        offsets.append(logical, &source, book, book_mut(&mut merged, logical));
    }
    tracing::Span::current().record("logical_books", merged.len());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BibleExt;
    use crate::naming::BookNaming;
    use crate::parse::Parser;
    use rstest::rstest;

    fn chapters(bible: &Bible, book: &str) -> Vec<u32> {
        bible.get(book).map(|b| b.chapters().map(|(n, _)| n).collect()).unwrap_or_default()
    }

    #[test]
    fn test_offsets_follow_highest_chapter() {
        let text = "1 Mose 1:1 a\n1 Mose 2:1 b\n1 Mose 3:1 c\n2 Mose 1:1 d\n2 Mose 2:1 e";
        let bible = consolidate(Parser::new().parse(text), &BookNaming::NumberedPrefix);
        assert_eq!(bible.keys().collect::<Vec<_>>(), ["Mose"]);
        assert_eq!(chapters(&bible, "Mose"), [1, 2, 3, 4, 5]);
        assert_eq!(bible.get("Mose").unwrap().verse(4, 1), Some("d"));
        assert_eq!(bible.get("Mose").unwrap().verse(5, 1), Some("e"));
    }

    #[rstest]
    #[case(BookNaming::Identity)]
    #[case(BookNaming::NumberedPrefix)]
    fn test_no_numbered_books_is_identity(#[case] rule: BookNaming) {
        let parsed = Parser::new().parse("Genesis 1:1 a\nGenesis 2:1 b\nExodus 1:1 c\nPsalms 23:1 d");
        assert_eq!(consolidate(parsed.clone(), &rule), parsed);
    }

    #[test]
    fn test_identity_rule_keeps_numbered_books_apart() {
        let parsed = Parser::new().parse("1 Mose 1:1 a\n2 Mose 1:1 b");
        assert_eq!(consolidate(parsed.clone(), &BookNaming::Identity), parsed);
    }

    #[test]
    fn test_gaps_propagate_into_offset() {
        // "1 Mose" has chapters 1 and 3, so "2 Mose" starts after 3.
        let text = "1 Mose 3:1 c\n1 Mose 1:1 a\n2 Mose 1:1 d";
        let bible = consolidate(Parser::new().parse(text), &BookNaming::NumberedPrefix);
        assert_eq!(chapters(&bible, "Mose"), [1, 3, 4]);
        assert_eq!(bible.get("Mose").unwrap().verse(4, 1), Some("d"));
    }

    #[test]
    fn test_first_appearance_order_not_prefix_value() {
        let text = "2 Könige 1:1 second\n2 Könige 2:1 second2\n1 Könige 1:1 first";
        let bible = consolidate(Parser::new().parse(text), &BookNaming::NumberedPrefix);
        let book = bible.get("Könige").unwrap();
        assert_eq!(book.verse(1, 1), Some("second"));
        assert_eq!(book.verse(3, 1), Some("first"));
    }

    #[test]
    fn test_logical_books_keep_first_source_position() {
        let text = "1 Mose 1:1 a\nHiob 1:1 b\n2 Mose 1:1 c\n1 Samuel 1:1 d";
        let bible = consolidate(Parser::new().parse(text), &BookNaming::NumberedPrefix);
        assert_eq!(bible.keys().collect::<Vec<_>>(), ["Mose", "Hiob", "Samuel"]);
        assert_eq!(chapters(&bible, "Mose"), [1, 2]);
    }

    #[test]
    fn test_unnumbered_and_numbered_share_logical_book() {
        let text = "Johannes 1:1 gospel\nJohannes 2:1 gospel2\n1 Johannes 1:1 letter";
        let bible = consolidate(Parser::new().parse(text), &BookNaming::NumberedPrefix);
        assert_eq!(chapters(&bible, "Johannes"), [1, 2, 3]);
        assert_eq!(bible.get("Johannes").unwrap().verse(3, 1), Some("letter"));
    }

    #[test]
    fn test_overflowing_chapter_is_dropped() {
        let text = format!("1 X {}:1 big\n2 X 1:1 a\n2 X 2:1 b", u32::MAX);
        let bible = consolidate(Parser::new().parse(&text), &BookNaming::NumberedPrefix);
        assert_eq!(chapters(&bible, "X"), [u32::MAX]);
    }

    #[test]
    fn test_verse_count_preserved() {
        let parsed = Parser::new().parse("1 Mose 1:1 a\n1 Mose 1:2 b\n2 Mose 1:1 c\n3 Mose 7:9 d");
        let verses = parsed.verse_count();
        assert_eq!(consolidate(parsed, &BookNaming::NumberedPrefix).verse_count(), verses);
    }
}
