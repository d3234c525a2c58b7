//! Parsed corpus data model.
//!
//! A [`Bible`] maps book names to [`Book`]s in first-appearance order; a
//! [`Book`] maps chapter numbers to [`Chapter`]s; a [`Chapter`] maps verse
//! numbers to text. Chapter and verse numbers are always at least 1.

mod book;

pub use self::book::{Book, Chapter};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Book name → [`Book`], in first-appearance order.
///
/// Replacing the value of an existing name keeps its original position,
/// which consolidation and metadata merging rely on.
pub type Bible = IndexMap<String, Book>;

/// Logical book name → [`BookMetadata`], in first-appearance order.
pub type Metadata = IndexMap<String, BookMetadata>;

/// Lookups across a whole [`Bible`].
pub trait BibleExt {
    /// Look up a single chapter.
    fn chapter(&self, book: &str, chapter: u32) -> Option<&Chapter>;
    /// Total number of verses across all books.
    fn verse_count(&self) -> usize;
}

impl BibleExt for Bible {
    fn chapter(&self, book: &str, chapter: u32) -> Option<&Chapter> {
        self.get(book)?.chapter(chapter)
    }

    fn verse_count(&self) -> usize {
        self.values().map(Book::verse_count).sum()
    }
}

pub trait MetadataExt {
    /// The `book → chapter count` view used for navigation.
    fn chapter_counts(&self) -> Vec<(&str, u32)>;
}

impl MetadataExt for Metadata {
    fn chapter_counts(&self) -> Vec<(&str, u32)> {
        self.iter().map(|(name, book)| (name.as_str(), book.chapter_count)).collect()
    }
}

/// The value for `name`, appending `V::default()` if absent.
///
/// Unlike `entry(name.to_string())` this only allocates for new names, which
/// matters when called once per corpus line.
pub(crate) fn book_mut<'a, V: Default>(books: &'a mut IndexMap<String, V>, name: &str) -> &'a mut V {
    let index = match books.get_index_of(name) {
        Some(index) => index,
        None => books.insert_full(name.to_string(), V::default()).0,
    };
    &mut books[index]
}

/// Navigation data for one book, without any verse text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookMetadata {
    /// Highest chapter number seen.
    pub chapter_count: u32,
    /// Chapter number → highest verse number seen in it.
    pub verses_per_chapter: BTreeMap<u32, u32>,
}

impl BookMetadata {
    /// Fold one `chapter:verse` reference into the running maxima.
    pub fn observe(&mut self, chapter: u32, verse: u32) {
        self.chapter_count = self.chapter_count.max(chapter);
        let max_verse = self.verses_per_chapter.entry(chapter).or_insert(0);
        *max_verse = (*max_verse).max(verse);
    }

    pub fn verse_count(&self, chapter: u32) -> Option<u32> {
        self.verses_per_chapter.get(&chapter).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_tracks_maxima() {
        let mut meta = BookMetadata::default();
        meta.observe(1, 3);
        meta.observe(1, 2);
        meta.observe(4, 7);
        assert_eq!(meta.chapter_count, 4);
        assert_eq!(meta.verse_count(1), Some(3));
        assert_eq!(meta.verse_count(4), Some(7));
        assert_eq!(meta.verse_count(2), None);
    }

    #[test]
    fn test_chapter_lookup() {
        let mut bible = Bible::new();
        book_mut(&mut bible, "Genesis").insert_verse(1, 1, "In the beginning");
        assert_eq!(bible.chapter("Genesis", 1).and_then(|c| c.get(&1)).map(String::as_str), Some("In the beginning"));
        assert!(bible.chapter("Exodus", 1).is_none());
        assert_eq!(bible.verse_count(), 1);
    }

    #[test]
    fn test_book_mut_appends_once() {
        let mut books: IndexMap<String, Vec<u32>> = IndexMap::new();
        book_mut(&mut books, "Genesis").push(1);
        book_mut(&mut books, "Exodus").push(1);
        book_mut(&mut books, "Genesis").push(2);
        assert_eq!(books.len(), 2);
        assert_eq!(books.get("Genesis"), Some(&vec![1, 2]));
        assert_eq!(books.first(), Some((&"Genesis".to_string(), &vec![1, 2])));
    }

    #[test]
    fn test_replacement_keeps_position() {
        let mut metadata = Metadata::new();
        metadata.insert("1 Mose".into(), BookMetadata { chapter_count: 50, ..Default::default() });
        metadata.insert("2 Mose".into(), BookMetadata { chapter_count: 40, ..Default::default() });
        metadata.insert("1 Mose".into(), BookMetadata { chapter_count: 1, ..Default::default() });
        assert_eq!(metadata.chapter_counts(), [("1 Mose", 1), ("2 Mose", 40)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_keeps_order() {
        let mut bible = Bible::new();
        for name in ["Sirach", "Amos", "Hiob"] {
            book_mut(&mut bible, name).insert_verse(1, 1, name);
        }
        let json = serde_json::to_string(&bible).unwrap();
        assert!(json.starts_with(r#"{"Sirach":"#), "{json}");
        let back: Bible = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), ["Sirach", "Amos", "Hiob"]);
    }
}
