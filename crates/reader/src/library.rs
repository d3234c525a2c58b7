use crate::error::{ErrorKind, Result};
use crate::events::{LoadEvent, LoadMode, Loaded, Scope, Stage};
use exn::OptionExt;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use vellum_cache::error::ErrorKind as CacheErrorKind;
use vellum_cache::{Cache, Partition, Stored};
use vellum_config::LanguageConfig;
use vellum_corpus::{Bible, Book, Metadata, NamingRule, SelectivePolicy, consolidate, extract_book_with, extract_metadata};
use vellum_source::SourceHandle;

pub fn bible_key(language: &str) -> String {
    format!("bible-{language}")
}

pub fn metadata_key(language: &str) -> String {
    format!("metadata-{language}")
}

/// Key for one selectively extracted book.
///
/// Chapter numbering depends on the policy, so it is part of the key. Fields
/// are separated by ':', which language codes may not contain; the book name
/// comes last and may contain anything.
pub fn book_key(language: &str, policy: SelectivePolicy, book: &str) -> String {
    format!("book:{language}:{policy}:{book}")
}

pub fn progress_key(language: &str) -> String {
    format!("progress-{language}")
}

/// Cache-first access to parsed corpora.
///
/// On a cache miss the corpus is fetched, decompressed and parsed, and the
/// result is written back before it is returned. Failed write-backs are
/// logged; the freshly parsed result is returned regardless. Each call is
/// independent, so several languages can load concurrently; the cache is
/// the only state they share.
#[derive(Clone)]
pub struct Library {
    source: SourceHandle,
    cache: Cache,
    languages: Arc<BTreeMap<String, LanguageConfig>>,
    policy: SelectivePolicy,
}

impl Library {
    pub fn new(source: SourceHandle, cache: Cache, languages: BTreeMap<String, LanguageConfig>) -> Self {
        Self {
            source,
            cache,
            languages: Arc::new(languages),
            policy: SelectivePolicy::default(),
        }
    }

    /// Chapter numbering used by [`load_book`](Self::load_book) for books
    /// that span several source books.
    pub fn with_selective_policy(mut self, policy: SelectivePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn languages(&self) -> impl Iterator<Item = (&str, &LanguageConfig)> {
        self.languages.iter().map(|(code, language)| (code.as_str(), language))
    }

    pub fn language(&self, code: &str) -> Result<&LanguageConfig> {
        self.languages
            .get(code)
            .ok_or_raise(|| ErrorKind::UnknownLanguage(code.to_string()))
    }

    /// The full corpus for `language`, consolidated when its naming rule
    /// asks for it.
    #[instrument(skip(self))]
    pub async fn load_data(&self, language: &str) -> Result<Arc<Bible>> {
        let config = self.language(language)?;
        if let Some(bible) = self.cached(Partition::Bible, &bible_key(language)).await? {
            return Ok(Arc::new(bible));
        }
        let text = self.fetch(config).await?;
        Ok(self.build_bible(language, config, &text).await)
    }

    /// Chapter and verse counts for `language`, without verse text.
    #[instrument(skip(self))]
    pub async fn load_metadata(&self, language: &str) -> Result<Arc<Metadata>> {
        let config = self.language(language)?;
        if let Some(metadata) = self.cached(Partition::Metadata, &metadata_key(language)).await? {
            return Ok(Arc::new(metadata));
        }
        let text = self.fetch(config).await?;
        Ok(self.build_metadata(language, config, &text).await)
    }

    /// A single logical book.
    #[instrument(skip(self))]
    pub async fn load_book(&self, language: &str, book: &str) -> Result<Arc<Book>> {
        let config = self.language(language)?;
        if let Some(cached) = self.cached(Partition::Book, &book_key(language, self.policy, book)).await? {
            return Ok(Arc::new(cached));
        }
        let text = self.fetch(config).await?;
        self.build_book(language, config, book, &text).await
    }

    /// Run a load as a stream of progress events ending in the result.
    ///
    /// A cache hit produces the result alone. In [`LoadMode::Background`] no
    /// progress events are emitted at all. The stream ends after the first
    /// error.
    pub fn load_events<'a>(
        &'a self,
        language: &'a str,
        scope: Scope,
        mode: LoadMode,
    ) -> impl Stream<Item = Result<LoadEvent>> + 'a {
        let report = mode == LoadMode::Interactive;
        async_stream::try_stream! {
            let config = self.language(language)?;
            match scope {
                Scope::Bible => {
                    let bible = match self.cached(Partition::Bible, &bible_key(language)).await? {
                        Some(bible) => Arc::new(bible),
                        None => {
                            if report {
                                yield LoadEvent::Progress(Stage::Fetching);
                            }
                            let text = self.fetch(config).await?;
                            if report {
                                yield LoadEvent::Progress(Stage::Parsing);
                            }
                            self.build_bible(language, config, &text).await
                        },
                    };
                    yield LoadEvent::Loaded(Loaded::Bible(bible));
                },
                Scope::Metadata => {
                    let metadata = match self.cached(Partition::Metadata, &metadata_key(language)).await? {
                        Some(metadata) => Arc::new(metadata),
                        None => {
                            if report {
                                yield LoadEvent::Progress(Stage::Fetching);
                            }
                            let text = self.fetch(config).await?;
                            if report {
                                yield LoadEvent::Progress(Stage::Metadata);
                            }
                            self.build_metadata(language, config, &text).await
                        },
                    };
                    yield LoadEvent::Loaded(Loaded::Metadata(metadata));
                },
                Scope::Book(book) => {
                    let loaded = match self.cached(Partition::Book, &book_key(language, self.policy, &book)).await? {
                        Some(cached) => Arc::new(cached),
                        None => {
                            if report {
                                yield LoadEvent::Progress(Stage::Fetching);
                            }
                            let text = self.fetch(config).await?;
                            if report {
                                yield LoadEvent::Progress(Stage::Book);
                            }
                            self.build_book(language, config, &book, &text).await?
                        },
                    };
                    yield LoadEvent::Loaded(Loaded::Book(loaded));
                },
            }
        }
    }

    async fn fetch(&self, config: &LanguageConfig) -> Result<String> {
        vellum_source::fetch_text(self.source.as_ref(), &config.resource)
            .await
            .map_err(ErrorKind::source)
    }

    /// A cache read. Payloads that no longer deserialize count as a miss.
    async fn cached<T: DeserializeOwned>(&self, partition: Partition, key: &str) -> Result<Option<T>> {
        match self.cache.get(partition, key).await {
            Ok(hit) => {
                tracing::debug!(%partition, key, hit = hit.is_some(), "Cache lookup");
                Ok(hit)
            },
            Err(err) if matches!(&*err, CacheErrorKind::InvalidData(_)) => {
                tracing::warn!(%partition, key, error = ?err, "Ignoring unreadable cache entry");
                Ok(None)
            },
            Err(err) => Err(ErrorKind::cache(err)),
        }
    }

    async fn build_bible(&self, language: &str, config: &LanguageConfig, text: &str) -> Arc<Bible> {
        let (parsed, report) = vellum_corpus::parse_with_report(text);
        if !report.is_clean() {
            tracing::info!(
                language,
                skipped = report.skipped - report.blank,
                "Corpus contains lines that are not verses"
            );
        }
        let bible = if config.naming.consolidates() {
            consolidate(parsed, &config.naming)
        } else {
            parsed
        };
        write_back(self.cache.set(Partition::Bible, &bible_key(language), &bible).await, language);
        Arc::new(bible)
    }

    async fn build_metadata(&self, language: &str, config: &LanguageConfig, text: &str) -> Arc<Metadata> {
        let metadata = extract_metadata(text, &config.naming);
        let stored = self
            .cache
            .set_with_size_limit(Partition::Metadata, &metadata_key(language), &metadata)
            .await;
        if let Ok(Stored::Skipped(size)) = stored {
            tracing::debug!(language, %size, "Metadata too large to cache");
        }
        write_back(stored, language);
        Arc::new(metadata)
    }

    async fn build_book(&self, language: &str, config: &LanguageConfig, name: &str, text: &str) -> Result<Arc<Book>> {
        let book = extract_book_with(text, name, &config.naming, self.policy);
        if book.is_empty() {
            exn::bail!(ErrorKind::UnknownBook(name.to_string()));
        }
        write_back(self.cache.set_book(&book_key(language, self.policy, name), &book).await, language);
        Ok(Arc::new(book))
    }
}

fn write_back<T>(result: vellum_cache::error::Result<T>, language: &str) {
    if let Err(err) = result {
        tracing::warn!(language, error = ?err, "Could not write to cache, continuing without it");
    }
}
