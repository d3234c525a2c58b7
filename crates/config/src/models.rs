use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use vellum_cache::{CacheOptions, Location};
use vellum_corpus::BookNaming;

const MIB: u64 = 1024 * 1024;

/// Where corpus resources are fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// An `http(s)://` base URL or a directory. Unset means the working
    /// directory.
    pub base: Option<String>,
}

/// The resolved form of [`SourceConfig::base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(String),
    Directory(PathBuf),
}

impl SourceConfig {
    pub fn location(&self) -> SourceLocation {
        match self.base.as_deref().map(str::trim) {
            Some(base) if base.starts_with("http://") || base.starts_with("https://") => {
                SourceLocation::Http(base.to_string())
            },
            Some(base) if !base.is_empty() => SourceLocation::Directory(PathBuf::from(base)),
            _ => SourceLocation::Directory(PathBuf::from(".")),
        }
    }
}

/// One translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Resource path relative to the source base.
    pub resource: String,
    #[serde(default)]
    pub naming: BookNaming,
    /// Book to open when no reading progress exists yet. Falls back to the
    /// first book in the corpus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_book: Option<String>,
}

impl LanguageConfig {
    pub fn new(resource: impl Into<String>, naming: BookNaming) -> Self {
        Self {
            resource: resource.into(),
            naming,
            default_book: None,
        }
    }
}

pub(crate) fn default_languages() -> BTreeMap<String, LanguageConfig> {
    BTreeMap::from([
        ("de".to_string(), LanguageConfig::new("texts/de/luther_1912.zst", BookNaming::NumberedPrefix)),
        ("en".to_string(), LanguageConfig::new("texts/en/web.zst", BookNaming::Identity)),
    ])
}

/// Cache location and size budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite file. Unset keeps the cache in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub max_size: u64,
    pub cleanup_threshold: u64,
    pub max_entry_size: u64,
    pub bytes_per_char: u64,
    pub eviction_ratio: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: crate::project_dirs().map(|dirs| dirs.cache_dir().join("vellum.sqlite")),
            max_size: 50 * MIB,
            cleanup_threshold: 40 * MIB,
            max_entry_size: 5 * MIB,
            bytes_per_char: 2,
            eviction_ratio: 0.2,
        }
    }
}

impl CacheConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.cleanup_threshold > self.max_size {
            exn::bail!(ErrorKind::invalid("cache.cleanup_threshold"));
        }
        if self.max_entry_size > self.max_size {
            exn::bail!(ErrorKind::invalid("cache.max_entry_size"));
        }
        if self.bytes_per_char == 0 {
            exn::bail!(ErrorKind::invalid("cache.bytes_per_char"));
        }
        if !(self.eviction_ratio > 0.0 && self.eviction_ratio <= 1.0) {
            exn::bail!(ErrorKind::invalid("cache.eviction_ratio"));
        }
        Ok(())
    }

    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            location: self.path.clone().map_or(Location::Memory, Location::File),
            max_size: self.max_size,
            cleanup_threshold: self.cleanup_threshold,
            max_entry_size: self.max_entry_size,
            bytes_per_char: self.bytes_per_char,
            eviction_ratio: self.eviction_ratio,
        }
    }
}
