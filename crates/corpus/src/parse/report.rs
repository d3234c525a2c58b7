use std::fmt::{Display, Formatter, Result as FmtResult};

/// Longest excerpt of a skipped line kept in a [`SkippedLine`].
const EXCERPT_CHARS: usize = 80;

/// Why a line did not produce a verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line.
    Blank,
    /// No `<book> <chapter>:<verse> <content>` structure.
    NoMatch,
    /// Book name is empty after trimming.
    EmptyBook,
    /// Chapter or verse is zero or does not fit in 32 bits.
    InvalidNumber,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            SkipReason::Blank => "blank line",
            SkipReason::NoMatch => "not a verse line",
            SkipReason::EmptyBook => "empty book name",
            SkipReason::InvalidNumber => "invalid chapter or verse number",
        })
    }
}

/// A line that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub reason: SkipReason,
    /// The start of the line, at most 80 characters.
    pub excerpt: String,
}

impl SkippedLine {
    pub(crate) fn new(line: usize, reason: SkipReason, text: &str) -> Self {
        Self {
            line,
            reason,
            excerpt: text.chars().take(EXCERPT_CHARS).collect(),
        }
    }
}

/// Diagnostics gathered while parsing a corpus.
///
/// Skipping a line is never an error; this report only makes format
/// regressions visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Lines seen, including blank ones.
    pub lines: usize,
    /// Lines that produced a verse.
    pub parsed: usize,
    /// Lines that did not, including blank ones.
    pub skipped: usize,
    /// The subset of `skipped` that was blank.
    pub blank: usize,
    /// Verses that replaced an earlier line with the same reference.
    pub overwritten: usize,
    /// The first non-blank skipped lines, up to the parser's sample limit.
    pub samples: Vec<SkippedLine>,
}

impl ParseReport {
    /// `true` when every non-blank line parsed.
    pub fn is_clean(&self) -> bool {
        self.skipped == self.blank
    }
}
