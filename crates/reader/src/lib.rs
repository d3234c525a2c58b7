//! The load pipeline that sits between a [`Source`](vellum_source::Source)
//! and the reader.
//!
//! [`Library`] turns a language code into a parsed corpus, its metadata or a
//! single book, going to the cache first and the source only on a miss.
//! [`Library::load_events`] runs the same pipeline as a stream of
//! [`LoadEvent`]s for callers that show progress. [`ProgressStore`] keeps the
//! reader's position per language and [`navigate`] steps between chapters.

pub mod error;
mod events;
mod library;
mod navigate;
mod progress;

pub use crate::events::{LoadEvent, LoadMode, Loaded, Scope, Stage};
pub use crate::library::{Library, bible_key, book_key, metadata_key, progress_key};
pub use crate::navigate::navigate;
pub use crate::progress::{Position, ProgressStore, ReadingProgress};
