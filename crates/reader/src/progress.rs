//! Per-language reading progress.

use crate::error::{ErrorKind, Result};
use crate::library::progress_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;
use vellum_cache::{Cache, Partition};
use vellum_corpus::Bible;

/// A chapter within a book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub book: String,
    pub chapter: u32,
}

impl Position {
    pub fn new(book: impl Into<String>, chapter: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
        }
    }
}

/// Where a reader is in one language's corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub last_read: Position,
    /// Book → highest chapter read.
    pub books: BTreeMap<String, u32>,
    /// Whether the reader has been shown the reading-path hint.
    #[serde(default)]
    pub path_notification: bool,
}

impl ReadingProgress {
    /// Fresh progress at chapter 1 of `book`.
    pub fn new(book: impl Into<String>) -> Self {
        let mut progress = Self {
            last_read: Position::new("", 1),
            books: BTreeMap::new(),
            path_notification: false,
        };
        progress.record(book, 1);
        progress
    }

    /// Fresh progress at `default_book` if the corpus has it, otherwise at
    /// its first book. `None` for an empty corpus.
    pub fn starting_at(bible: &Bible, default_book: Option<&str>) -> Option<Self> {
        let book = default_book
            .filter(|book| bible.contains_key(*book))
            .or_else(|| bible.first().map(|(name, _)| name.as_str()))?;
        Some(Self::new(book))
    }

    /// Move to `book`/`chapter` and remember it as read.
    pub fn record(&mut self, book: impl Into<String>, chapter: u32) {
        let book = book.into();
        let highest = self.books.entry(book.clone()).or_insert(chapter);
        *highest = (*highest).max(chapter);
        self.last_read = Position { book, chapter };
    }

    pub fn highest_chapter(&self, book: &str) -> Option<u32> {
        self.books.get(book).copied()
    }

    /// The chapter to open when a book is picked from the list.
    pub fn resume_chapter(&self, book: &str) -> u32 {
        self.highest_chapter(book).unwrap_or(1)
    }

    /// Share of `book` read, in `0.0..=1.0`.
    pub fn completion(&self, book: &str, chapter_count: u32) -> f64 {
        match (self.highest_chapter(book), chapter_count) {
            (_, 0) | (None, _) => 0.0,
            (Some(read), total) => (f64::from(read) / f64::from(total)).min(1.0),
        }
    }

    /// Point `last_read` back at the first book when it names a book the
    /// corpus no longer has. Returns whether anything changed.
    pub fn reconcile(&mut self, bible: &Bible) -> bool {
        if bible.contains_key(&self.last_read.book) {
            return false;
        }
        match bible.first() {
            Some((first, _)) => {
                let first = first.to_string();
                self.record(first, 1);
                true
            },
            None => false,
        }
    }
}

/// Reading progress persisted in the cache's progress partition.
///
/// Every mutation is written before the call returns.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    cache: Cache,
}

impl ProgressStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub async fn get(&self, language: &str) -> Result<Option<ReadingProgress>> {
        self.cache
            .get(Partition::Progress, &progress_key(language))
            .await
            .map_err(ErrorKind::cache)
    }

    pub async fn save(&self, language: &str, progress: &ReadingProgress) -> Result<()> {
        self.cache
            .set(Partition::Progress, &progress_key(language), progress)
            .await
            .map_err(ErrorKind::cache)
    }

    /// Stored progress for `language`, checked against `bible`, or fresh
    /// progress when nothing usable is stored. Repairs are saved.
    #[instrument(skip(self, bible))]
    pub async fn load(&self, language: &str, bible: &Bible, default_book: Option<&str>) -> Result<ReadingProgress> {
        let stored = self.get(language).await?;
        let (progress, changed) = match stored {
            Some(mut progress) => {
                let changed = progress.reconcile(bible);
                (progress, changed)
            },
            None => match ReadingProgress::starting_at(bible, default_book) {
                Some(progress) => (progress, true),
                None => exn::bail!(ErrorKind::UnknownBook(default_book.unwrap_or_default().to_string())),
            },
        };
        if changed {
            tracing::debug!(language, book = %progress.last_read.book, "Resetting reading position");
            self.save(language, &progress).await?;
        }
        Ok(progress)
    }

    /// Record a read and persist it.
    pub async fn record(&self, language: &str, progress: &mut ReadingProgress, position: Position) -> Result<()> {
        progress.record(position.book, position.chapter);
        self.save(language, progress).await
    }

    pub async fn set_path_notification(&self, language: &str, progress: &mut ReadingProgress, shown: bool) -> Result<()> {
        progress.path_notification = shown;
        self.save(language, progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vellum_cache::CacheOptions;

    fn bible() -> Bible {
        vellum_corpus::parse("Genesis 1:1 a\nGenesis 2:1 b\nGenesis 3:1 c\nExodus 1:1 d\nExodus 2:1 e")
    }

    #[test]
    fn test_record_keeps_highest_chapter() {
        let mut progress = ReadingProgress::new("Genesis");
        progress.record("Genesis", 3);
        progress.record("Genesis", 2);
        assert_eq!(progress.last_read, Position::new("Genesis", 2));
        assert_eq!(progress.highest_chapter("Genesis"), Some(3));
        assert_eq!(progress.resume_chapter("Genesis"), 3);
        assert_eq!(progress.resume_chapter("Exodus"), 1);
    }

    #[rstest]
    #[case(None, "Genesis")]
    #[case(Some("Exodus"), "Exodus")]
    #[case(Some("Leviticus"), "Genesis")]
    fn test_starting_at(#[case] default_book: Option<&str>, #[case] expected: &str) {
        let progress = ReadingProgress::starting_at(&bible(), default_book).unwrap();
        assert_eq!(progress.last_read, Position::new(expected, 1));
        assert_eq!(progress.highest_chapter(expected), Some(1));
    }

    #[test]
    fn test_starting_at_empty_corpus() {
        assert!(ReadingProgress::starting_at(&Bible::new(), None).is_none());
    }

    #[test]
    fn test_reconcile_resets_missing_book() {
        let mut progress = ReadingProgress::new("1. Mose");
        assert!(progress.reconcile(&bible()));
        assert_eq!(progress.last_read, Position::new("Genesis", 1));

        let mut progress = ReadingProgress::new("Exodus");
        assert!(!progress.reconcile(&bible()));
        assert_eq!(progress.last_read.book, "Exodus");
    }

    #[rstest]
    #[case(None, 50, 0.0)]
    #[case(Some(25), 50, 0.5)]
    #[case(Some(50), 50, 1.0)]
    #[case(Some(3), 0, 0.0)]
    fn test_completion(#[case] read: Option<u32>, #[case] total: u32, #[case] expected: f64) {
        let mut progress = ReadingProgress::new("Exodus");
        if let Some(chapter) = read {
            progress.record("Genesis", chapter);
        }
        assert_eq!(progress.completion("Genesis", total), expected);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&ReadingProgress::new("Genesis")).unwrap();
        assert_eq!(json, r#"{"lastRead":{"book":"Genesis","chapter":1},"books":{"Genesis":1},"pathNotification":false}"#);
        let legacy: ReadingProgress = serde_json::from_str(r#"{"lastRead":{"book":"Genesis","chapter":4},"books":{}}"#).unwrap();
        assert!(!legacy.path_notification);
    }

    #[tokio::test]
    async fn test_store_persists_every_mutation() {
        let cache = Cache::new(CacheOptions::default());
        let store = ProgressStore::new(cache.clone());
        let bible = bible();

        let mut progress = store.load("en", &bible, None).await.unwrap();
        assert_eq!(progress.last_read, Position::new("Genesis", 1));
        assert_eq!(store.get("en").await.unwrap().as_ref(), Some(&progress));

        store.record("en", &mut progress, Position::new("Exodus", 2)).await.unwrap();
        let reopened = ProgressStore::new(cache.clone());
        assert_eq!(reopened.get("en").await.unwrap().unwrap().last_read, Position::new("Exodus", 2));

        store.set_path_notification("en", &mut progress, true).await.unwrap();
        assert!(reopened.get("en").await.unwrap().unwrap().path_notification);
        assert_eq!(store.get("de").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_repairs_stale_position() {
        let store = ProgressStore::new(Cache::new(CacheOptions::default()));
        store.save("de", &ReadingProgress::new("1. Mose")).await.unwrap();
        let progress = store.load("de", &bible(), None).await.unwrap();
        assert_eq!(progress.last_read, Position::new("Genesis", 1));
        assert_eq!(store.get("de").await.unwrap().unwrap().last_read.book, "Genesis");
        // The stale book's history is kept.
        assert_eq!(progress.highest_chapter("1. Mose"), Some(1));
    }

    #[tokio::test]
    async fn test_store_empty_corpus() {
        let store = ProgressStore::new(Cache::new(CacheOptions::default()));
        let err = store.load("en", &Bible::new(), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownBook(_)));
    }
}
