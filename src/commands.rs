//! Subcommand handlers.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use std::path::Path;
use std::pin::pin;
use std::sync::Arc;
use vellum_cache::{Cache, Partition};
use vellum_config::{Config, SourceLocation};
use vellum_corpus::{Bible, BibleExt, Metadata, MetadataExt, NamingRule, SelectivePolicy};
use vellum_reader::{LoadEvent, LoadMode, Loaded, Position, ProgressStore, ReadingProgress, Scope, navigate};
use vellum_source::{HttpSource, LocalSource, SourceHandle};

pub struct Context {
    config: Config,
    source: SourceHandle,
    library: vellum_reader::Library,
    progress: ProgressStore,
    mode: LoadMode,
}

impl Context {
    pub fn new(config_path: Option<&Path>, background: bool) -> Result<Self> {
        let config = Config::load(config_path).or_raise(|| ErrorKind::Config)?;
        let source: SourceHandle = match config.source.location() {
            SourceLocation::Http(base) => Arc::new(HttpSource::new("http", base).or_raise(|| ErrorKind::Source)?),
            SourceLocation::Directory(root) => {
                Arc::new(LocalSource::new("local", root).or_raise(|| ErrorKind::Source)?)
            },
        };
        let cache = Cache::new(config.cache.options());
        // Chapters have to line up with the consolidated corpus used for
        // navigation and progress.
        let library = vellum_reader::Library::new(source.clone(), cache.clone(), config.languages.clone())
            .with_selective_policy(SelectivePolicy::Consolidated);
        let mode = if background { LoadMode::Background } else { LoadMode::Interactive };
        Ok(Self {
            config,
            source,
            library,
            progress: ProgressStore::new(cache),
            mode,
        })
    }

    pub async fn close(&self) {
        self.library.cache().close().await;
    }

    pub async fn read(&self, language: &str, book: Option<&str>, chapter: Option<u32>) -> Result<()> {
        let bible = self.load_bible(language).await?;
        let default_book = self.config.language(language).and_then(|l| l.default_book.as_deref());
        let mut progress = self
            .progress
            .load(language, &bible, default_book)
            .await
            .map_err(|err| ErrorKind::load(format!("{language} reading progress"), err.is_retryable(), err))?;

        let book = book.unwrap_or(progress.last_read.book.as_str()).to_string();
        let chapter = match (chapter, book == progress.last_read.book) {
            (Some(chapter), _) => chapter,
            (None, true) => progress.last_read.chapter,
            (None, false) => progress.resume_chapter(&book),
        };
        let verses = bible.chapter(&book, chapter).ok_or_raise(|| ErrorKind::NoChapter {
            book: book.clone(),
            chapter,
        })?;

        println!("{book} {chapter}\n");
        for (verse, text) in verses {
            println!("{verse:>3} {text}");
        }

        let position = Position::new(book, chapter);
        let previous = navigate(&bible, &position, -1);
        let next = navigate(&bible, &position, 1);
        println!();
        if let Some(previous) = previous {
            println!("Previous: {} {}", previous.book, previous.chapter);
        }
        if let Some(next) = next {
            println!("Next: {} {}", next.book, next.chapter);
        }

        self.progress
            .record(language, &mut progress, position)
            .await
            .map_err(|err| ErrorKind::load(format!("{language} reading progress"), err.is_retryable(), err))
    }

    pub async fn books(&self, language: &str) -> Result<()> {
        let progress = self
            .progress
            .get(language)
            .await
            .map_err(|err| ErrorKind::load(format!("{language} reading progress"), err.is_retryable(), err))?;
        // Metadata counts for multi-part books are only approximate, so
        // consolidating languages pay for a full parse instead.
        let consolidates = self.config.language(language).is_some_and(|l| l.naming.consolidates());
        let bible;
        let metadata;
        let counts = if consolidates {
            bible = self.load_bible(language).await?;
            bible_chapter_counts(&bible)
        } else {
            metadata = self.load_metadata(language).await?;
            metadata.chapter_counts()
        };
        for (book, chapters) in counts {
            match completion(progress.as_ref(), book, chapters) {
                Some(done) => println!("{book:<24} {chapters:>4}  {:>3.0}% read", done * 100.0),
                None => println!("{book:<24} {chapters:>4}"),
            }
        }
        Ok(())
    }

    pub async fn stats(&self, language: &str) -> Result<()> {
        let config = self
            .library
            .language(language)
            .map_err(|err| ErrorKind::load(language, err.is_retryable(), err))?;
        let text = vellum_source::fetch_text(self.source.as_ref(), &config.resource)
            .await
            .map_err(|err| ErrorKind::load(&config.resource, err.is_retryable(), err))?;
        let (bible, report) = vellum_corpus::parse_with_report(&text);
        println!("Lines:        {}", report.lines);
        println!("Verses:       {}", report.parsed);
        println!("Blank:        {}", report.blank);
        println!("Skipped:      {}", report.skipped - report.blank);
        println!("Overwritten:  {}", report.overwritten);
        println!("Source books: {}", bible.len());
        if config.naming.consolidates() {
            let logical = vellum_corpus::consolidate(bible, &config.naming);
            println!("Books:        {}", logical.len());
        }
        for sample in &report.samples {
            println!("  line {}: {} ({})", sample.line, sample.excerpt, sample.reason);
        }
        Ok(())
    }

    pub async fn cache_size(&self) -> Result<()> {
        let cache = self.library.cache();
        let size = cache.cache_size().await.map_err(ErrorKind::cache)?;
        println!("Total: {size} (cleanup above {} bytes)", cache.options().cleanup_threshold);
        for partition in Partition::ALL {
            let count = cache.count(partition).await.map_err(ErrorKind::cache)?;
            println!("  {partition:<10} {count} entries");
        }
        Ok(())
    }

    pub async fn cache_cleanup(&self) -> Result<()> {
        let removed = self
            .library
            .cache()
            .cleanup_old_entries()
            .await
            .map_err(ErrorKind::cache)?;
        println!("Removed {removed} cached books");
        Ok(())
    }

    pub async fn cache_clear(&self, partition: Option<Partition>) -> Result<()> {
        let removed = self.library.cache().clear(partition).await.map_err(ErrorKind::cache)?;
        println!("Removed {removed} entries");
        Ok(())
    }

    pub async fn cache_list(&self, partition: Partition) -> Result<()> {
        let entries = self.library.cache().list(partition).await.map_err(ErrorKind::cache)?;
        for entry in entries {
            let created = entry.created_at.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
            println!("{:<40} {:>16}  {created}", entry.key, entry.size.to_string());
        }
        Ok(())
    }

    async fn load_bible(&self, language: &str) -> Result<Arc<Bible>> {
        match self.load(language, Scope::Bible).await? {
            Loaded::Bible(bible) => Ok(bible),
            _ => exn::bail!(unexpected(language)),
        }
    }

    async fn load_metadata(&self, language: &str) -> Result<Arc<Metadata>> {
        match self.load(language, Scope::Metadata).await? {
            Loaded::Metadata(metadata) => Ok(metadata),
            _ => exn::bail!(unexpected(language)),
        }
    }

    /// Drive a load to completion, printing progress to stderr.
    async fn load(&self, language: &str, scope: Scope) -> Result<Loaded> {
        let mut events = pin!(self.library.load_events(language, scope, self.mode));
        while let Some(event) = events.next().await {
            match event.map_err(|err| ErrorKind::load(language, err.is_retryable(), err))? {
                LoadEvent::Progress(stage) => eprintln!("{stage}"),
                LoadEvent::Loaded(loaded) => return Ok(loaded),
            }
        }
        exn::bail!(unexpected(language))
    }
}

/// A load that ended without the result its scope asked for.
fn unexpected(language: &str) -> ErrorKind {
    ErrorKind::Load {
        what: language.to_string(),
        retryable: false,
    }
}

/// Chapter counts of an already consolidated corpus, in book order.
fn bible_chapter_counts(bible: &Bible) -> Vec<(&str, u32)> {
    bible
        .iter()
        .map(|(name, book)| (name.as_str(), book.max_chapter().unwrap_or(0)))
        .collect()
}

/// Share of `book` read, or `None` if it was never opened.
fn completion(progress: Option<&ReadingProgress>, book: &str, chapters: u32) -> Option<f64> {
    let progress = progress?;
    progress.highest_chapter(book)?;
    Some(progress.completion(book, chapters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vellum_corpus::{BookNaming, consolidate, extract_metadata, parse};

    const GERMAN: &str = "\
1 Mose 1:1 Am Anfang
1 Mose 2:1 So wurden vollendet
1 Mose 3:1 Und die Schlange
2 Mose 1:1 Dies sind die Namen
2 Mose 2:1 Und es ging hin
Hiob 1:1 Es war ein Mann
";

    #[test]
    fn test_consolidated_counts_span_every_part() {
        let bible = consolidate(parse(GERMAN), &BookNaming::NumberedPrefix);
        assert_eq!(bible_chapter_counts(&bible), [("Mose", 5), ("Hiob", 1)]);
        // Metadata alone keeps only the last part.
        let metadata = extract_metadata(GERMAN, &BookNaming::NumberedPrefix);
        assert_eq!(metadata.chapter_counts(), [("Mose", 2), ("Hiob", 1)]);
    }

    #[rstest]
    #[case("Mose", Some(0.8))]
    #[case("Hiob", None)]
    fn test_completion_uses_consolidated_counts(#[case] book: &str, #[case] expected: Option<f64>) {
        let bible = consolidate(parse(GERMAN), &BookNaming::NumberedPrefix);
        let mut progress = ReadingProgress::new("Mose");
        progress.record("Mose", 4);
        let chapters = bible_chapter_counts(&bible)
            .into_iter()
            .find_map(|(name, chapters)| (name == book).then_some(chapters))
            .unwrap();
        assert_eq!(completion(Some(&progress), book, chapters), expected);
    }

    #[test]
    fn test_completion_without_progress() {
        assert_eq!(completion(None, "Mose", 5), None);
    }
}
