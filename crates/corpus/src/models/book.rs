use std::collections::BTreeMap;

/// Verse number → verse text.
pub type Chapter = BTreeMap<u32, String>;

/// Chapter number → [`Chapter`], ordered numerically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Book {
    chapters: BTreeMap<u32, Chapter>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.get(&number)
    }

    pub fn verse(&self, chapter: u32, verse: u32) -> Option<&str> {
        self.chapters.get(&chapter)?.get(&verse).map(String::as_str)
    }

    /// Set a verse, creating the chapter on first use.
    ///
    /// Returns the text it replaced; the later line always wins.
    pub fn insert_verse(&mut self, chapter: u32, verse: u32, text: impl Into<String>) -> Option<String> {
        self.chapters.entry(chapter).or_default().insert(verse, text.into())
    }

    /// Replace a whole chapter.
    pub fn insert_chapter(&mut self, number: u32, chapter: Chapter) -> Option<Chapter> {
        self.chapters.insert(number, chapter)
    }

    /// Number of distinct chapters present.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Highest chapter number present, which can exceed
    /// [`chapter_count`](Self::chapter_count) when numbering has gaps.
    pub fn max_chapter(&self) -> Option<u32> {
        self.chapters.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.values().map(BTreeMap::len).sum()
    }

    /// Chapters in ascending numeric order.
    pub fn chapters(&self) -> impl Iterator<Item = (u32, &Chapter)> {
        self.chapters.iter().map(|(&number, chapter)| (number, chapter))
    }
}

impl IntoIterator for Book {
    type Item = (u32, Chapter);
    type IntoIter = std::collections::btree_map::IntoIter<u32, Chapter>;
    fn into_iter(self) -> Self::IntoIter {
        self.chapters.into_iter()
    }
}

impl FromIterator<(u32, Chapter)> for Book {
    fn from_iter<I: IntoIterator<Item = (u32, Chapter)>>(iter: I) -> Self {
        Self {
            chapters: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gapped_numbering() {
        let mut book = Book::new();
        book.insert_verse(1, 1, "a");
        book.insert_verse(3, 1, "b");
        assert_eq!(book.chapter_count(), 2);
        assert_eq!(book.max_chapter(), Some(3));
        assert_eq!(book.verse(3, 1), Some("b"));
        assert_eq!(book.verse(2, 1), None);
    }

    #[test]
    fn test_later_verse_replaces_earlier() {
        let mut book = Book::new();
        assert_eq!(book.insert_verse(1, 1, "first"), None);
        assert_eq!(book.insert_verse(1, 1, "second"), Some("first".to_string()));
        assert_eq!(book.verse(1, 1), Some("second"));
        assert_eq!(book.verse_count(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_numeric_string_keys() {
        let mut book = Book::new();
        book.insert_verse(2, 1, "Now the serpent");
        book.insert_verse(10, 1, "These are the generations");
        let json = serde_json::to_string(&book).unwrap();
        assert_eq!(json, r#"{"2":{"1":"Now the serpent"},"10":{"1":"These are the generations"}}"#);
        assert_eq!(serde_json::from_str::<Book>(&json).unwrap(), book);
    }
}
