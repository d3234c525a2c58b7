//! Line parser: flat corpus text → [`Bible`].

mod report;

pub use self::report::{ParseReport, SkipReason, SkippedLine};
use crate::consts;
use crate::models::{Bible, book_mut};
use tracing::instrument;

/// Number of skipped lines a [`ParseReport`] keeps by default.
pub const DEFAULT_SAMPLE_LIMIT: usize = 16;

/// One successfully matched corpus line, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseLine<'a> {
    /// Source-level book name, trimmed.
    pub book: &'a str,
    pub chapter: u32,
    pub verse: u32,
    /// Verse text, trimmed.
    pub content: &'a str,
}

/// Match a single line against `<book> <chapter>:<verse> <content>`.
///
/// The book name runs up to the first whitespace-delimited `digits:digits`
/// marker, so it may contain spaces and a leading number. All four parts are
/// trimmed.
///
/// ```
/// use vellum_corpus::{SkipReason, parse_line};
///
/// let line = parse_line("1 Mose 1:1 Am Anfang schuf Gott Himmel und Erde.").unwrap();
/// assert_eq!((line.book, line.chapter, line.verse), ("1 Mose", 1, 1));
/// assert_eq!(line.content, "Am Anfang schuf Gott Himmel und Erde.");
/// assert_eq!(parse_line("---"), Err(SkipReason::NoMatch));
/// ```
pub fn parse_line(line: &str) -> Result<VerseLine<'_>, SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    let captures = consts::LINE_REGEX.captures(line).ok_or(SkipReason::NoMatch)?;
    // All four groups are mandatory in the pattern.
    let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());
    let book = group(1).trim();
    if book.is_empty() {
        return Err(SkipReason::EmptyBook);
    }
    let number = |s: &str| s.parse::<u32>().ok().filter(|&n| n >= 1).ok_or(SkipReason::InvalidNumber);
    Ok(VerseLine {
        book,
        chapter: number(group(2))?,
        verse: number(group(3))?,
        content: group(4).trim(),
    })
}

/// Split corpus text into raw lines, ignoring a leading byte-order mark.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.strip_prefix('\u{feff}').unwrap_or(text).split('\n')
}

/// Iterate over the matching lines of a corpus, silently dropping the rest.
pub fn verse_lines(text: &str) -> impl Iterator<Item = VerseLine<'_>> {
    lines(text).filter_map(|line| parse_line(line).ok())
}

/// Turns corpus text into a [`Bible`].
///
/// Parsing is synchronous, deterministic and depends only on its input. Lines
/// that don't match are skipped; when the same reference appears twice, the
/// later line wins.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    sample_limit: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of skipped lines recorded in [`ParseReport::samples`].
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Parse without collecting diagnostics.
    pub fn parse(&self, text: &str) -> Bible {
        let mut bible = Bible::new();
        for line in verse_lines(text) {
            book_mut(&mut bible, line.book).insert_verse(line.chapter, line.verse, line.content);
        }
        bible
    }

    /// Parse and report which lines were skipped.
    #[instrument(skip(self, text), fields(text_size = text.len(), books, parsed, skipped))]
    pub fn parse_with_report(&self, text: &str) -> (Bible, ParseReport) {
        let mut bible = Bible::new();
        let mut report = ParseReport::default();
        for (i, line) in lines(text).enumerate() {
            report.lines += 1;
            match parse_line(line) {
                Ok(verse) => {
                    report.parsed += 1;
                    let book = book_mut(&mut bible, verse.book);
                    if book.insert_verse(verse.chapter, verse.verse, verse.content).is_some() {
                        report.overwritten += 1;
                    }
                },
                Err(reason) => {
                    report.skipped += 1;
                    if reason == SkipReason::Blank {
                        report.blank += 1;
                    } else if report.samples.len() < self.sample_limit {
                        report.samples.push(SkippedLine::new(i + 1, reason, line));
                    }
                },
            }
        }
        let span = tracing::Span::current();
        span.record("books", bible.len());
        span.record("parsed", report.parsed);
        span.record("skipped", report.skipped);
        if !report.is_clean() {
            tracing::debug!(malformed = report.skipped - report.blank, "Skipped malformed corpus lines");
        }
        (bible, report)
    }
}
