use derive_more::Display;
use std::sync::Arc;
use vellum_corpus::{Bible, Book, Metadata};

/// A pipeline step worth telling the user about.
///
/// Labels are for display only and carry no other meaning.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    #[display("Fetching and decompressing text...")]
    Fetching,
    #[display("Parsing Bible data...")]
    Parsing,
    #[display("Loading book metadata...")]
    Metadata,
    #[display("Loading book data...")]
    Book,
}

/// What to load for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The whole corpus, consolidated.
    Bible,
    /// Chapter and verse counts only.
    Metadata,
    /// One logical book.
    Book(String),
}

/// Whether progress events are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    #[default]
    Interactive,
    /// Preloading that nobody is watching: only the result is emitted.
    Background,
}

/// A finished load. Results are shared immutably.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Bible(Arc<Bible>),
    Metadata(Arc<Metadata>),
    Book(Arc<Book>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Progress(Stage),
    Loaded(Loaded),
}
