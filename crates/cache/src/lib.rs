//! Persistent structured cache for parsed corpora.
//!
//! Values are JSON payloads in a single SQLite table, addressed by a
//! [`Partition`] and a key. Caching is an optimization: losing the database
//! only means the next load parses the corpus again.
//!
//! # Size budget
//! Sizes are estimates: serialized characters times
//! [`CacheOptions::bytes_per_char`]. Two watermarks give hysteresis:
//! [`Cache::set_book`] evicts the oldest book entries (a fifth by default) once the
//! total passes [`CacheOptions::cleanup_threshold`], which sits below
//! [`CacheOptions::max_size`]. [`Cache::set_with_size_limit`] refuses single
//! values above [`CacheOptions::max_entry_size`] without failing.

mod cache;
mod db;
pub mod error;
mod models;

pub use crate::cache::{Cache, CacheOptions, Location};
pub use crate::db::Database;
pub use crate::models::{EntryInfo, Partition, SizeEstimate, Stored};
