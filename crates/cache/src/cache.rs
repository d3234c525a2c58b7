use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{EntryInfo, EntryRow, Partition, SizeEstimate, Stored, now_millis};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;

const MIB: u64 = 1024 * 1024;

/// Where the cache database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Location {
    /// Lost when the process exits.
    #[default]
    Memory,
    File(PathBuf),
}

/// Size budget and eviction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOptions {
    pub location: Location,
    /// Hard maximum for the estimated total size.
    pub max_size: u64,
    /// [`Cache::set_book`] evicts once the estimated total exceeds this.
    pub cleanup_threshold: u64,
    /// [`Cache::set_with_size_limit`] skips values estimated above this.
    pub max_entry_size: u64,
    /// Estimated bytes per serialized character.
    pub bytes_per_char: u64,
    /// Fraction of book entries removed per cleanup, in `0.0..=1.0`.
    pub eviction_ratio: f64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            location: Location::Memory,
            max_size: 50 * MIB,
            cleanup_threshold: 40 * MIB,
            max_entry_size: 5 * MIB,
            bytes_per_char: 2,
            eviction_ratio: 0.2,
        }
    }
}

impl CacheOptions {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            ..Self::default()
        }
    }
}

/// Persistent key-value store for parsed corpora.
///
/// Values are stored as JSON under a `(partition, key)` pair. The database is
/// opened on the first operation and stays open for the life of the cache
/// (clones share it). Every call is its own transaction; concurrent writes
/// to the same key race and the last commit wins.
#[derive(Debug, Clone)]
pub struct Cache {
    options: Arc<CacheOptions>,
    db: Arc<OnceCell<Database>>,
}

impl Cache {
    /// Create a cache without touching the backing store.
    pub fn new(options: CacheOptions) -> Self {
        Self {
            options: Arc::new(options),
            db: Arc::new(OnceCell::new()),
        }
    }

    /// Wrap an already connected database.
    pub fn with_database(db: Database, options: CacheOptions) -> Self {
        Self {
            options: Arc::new(options),
            db: Arc::new(OnceCell::new_with(Some(db))),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// The connected database, opening it on first use.
    pub async fn database(&self) -> Result<&Database> {
        self.db
            .get_or_try_init(|| async {
                match &self.options.location {
                    Location::Memory => Database::connect_in_memory().await,
                    Location::File(path) => {
                        tracing::debug!(path = %path.display(), "Opening cache database");
                        Database::connect(path).await
                    },
                }
            })
            .await
    }

    fn estimate(&self, payload: &str) -> SizeEstimate {
        let chars = u64::try_from(payload.chars().count()).unwrap_or(u64::MAX);
        SizeEstimate::from_chars(chars, self.options.bytes_per_char)
    }

    // =========================================================================
    // Basic operations
    // =========================================================================

    #[instrument(skip(self), fields(hit))]
    pub async fn get<T: DeserializeOwned>(&self, partition: Partition, key: &str) -> Result<Option<T>> {
        let db = self.database().await?;
        let payload: Option<String> = sqlx::query_scalar(include_str!("../queries/get_entry.sql"))
            .bind(partition.as_str())
            .bind(key)
            .fetch_optional(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::Span::current().record("hit", payload.is_some());
        payload
            .map(|payload| serde_json::from_str(&payload).or_raise(|| ErrorKind::InvalidData("payload")))
            .transpose()
    }

    /// Store a value without a timestamp, replacing any previous one.
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize + ?Sized>(&self, partition: Partition, key: &str, value: &T) -> Result<()> {
        let payload = encode(value)?;
        self.write(partition, key, &payload, None).await
    }

    /// Returns whether an entry was removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, partition: Partition, key: &str) -> Result<bool> {
        let db = self.database().await?;
        let result = sqlx::query(include_str!("../queries/delete_entry.sql"))
            .bind(partition.as_str())
            .bind(key)
            .execute(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn write(
        &self,
        partition: Partition,
        key: &str,
        payload: &str,
        created_at: Option<i64>,
    ) -> Result<()> {
        let db = self.database().await?;
        sqlx::query(include_str!("../queries/upsert_entry.sql"))
            .bind(partition.as_str())
            .bind(key)
            .bind(payload)
            .bind(created_at)
            .execute(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    // =========================================================================
    // Size-aware writes
    // =========================================================================

    /// Store a single book in the [`Partition::Book`] partition with the
    /// current timestamp.
    ///
    /// Checks the total size first and runs
    /// [`cleanup_old_entries`](Self::cleanup_old_entries) when it exceeds the
    /// cleanup threshold. Failures of that check are logged, never returned;
    /// only the write itself can fail.
    #[instrument(skip(self, value), fields(size))]
    pub async fn set_book<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let payload = encode(value)?;
        let size = self.estimate(&payload);
        tracing::Span::current().record("size", size.bytes());
        self.make_room(size).await;
        self.write(Partition::Book, key, &payload, Some(now_millis())).await
    }

    /// Store a value with the current timestamp, unless its estimated size
    /// exceeds the per-entry cap, in which case nothing is written.
    #[instrument(skip(self, value), fields(size))]
    pub async fn set_with_size_limit<T: Serialize + ?Sized>(
        &self,
        partition: Partition,
        key: &str,
        value: &T,
    ) -> Result<Stored> {
        let payload = encode(value)?;
        let size = self.estimate(&payload);
        tracing::Span::current().record("size", size.bytes());
        if size.bytes() > self.options.max_entry_size {
            tracing::debug!(limit = self.options.max_entry_size, "Entry too large to cache, skipping");
            return Ok(Stored::Skipped(size));
        }
        self.write(partition, key, &payload, Some(now_millis())).await?;
        Ok(Stored::Written)
    }

    /// Best-effort eviction before a book write. Size checks are advisory:
    /// concurrent writers may overshoot the budget.
    async fn make_room(&self, incoming: SizeEstimate) {
        let size = match self.cache_size().await {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(error = ?err, "Could not estimate cache size, skipping cleanup");
                return;
            },
        };
        if size.bytes() <= self.options.cleanup_threshold {
            return;
        }
        match self.cleanup_old_entries().await {
            Ok(removed) => tracing::debug!(removed, %size, "Cache above cleanup threshold, evicted old books"),
            Err(err) => {
                tracing::warn!(error = ?err, "Cache cleanup failed");
                return;
            },
        }
        match self.cache_size().await {
            Ok(after) if after.bytes().saturating_add(incoming.bytes()) > self.options.max_size => {
                tracing::warn!(size = %after, max = self.options.max_size, "Cache still exceeds its maximum size");
            },
            Ok(_) => {},
            Err(err) => tracing::warn!(error = ?err, "Could not estimate cache size after cleanup"),
        }
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Estimated size of every stored value across all partitions.
    #[instrument(skip(self))]
    pub async fn cache_size(&self) -> Result<SizeEstimate> {
        let db = self.database().await?;
        let chars: i64 = sqlx::query_scalar(include_str!("../queries/cache_size.sql"))
            .fetch_one(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let chars = u64::try_from(chars).or_raise(|| ErrorKind::InvalidData("cache size"))?;
        Ok(SizeEstimate::from_chars(chars, self.options.bytes_per_char))
    }

    /// Delete the oldest book entries: `floor(count * eviction_ratio)` of
    /// them, ordered by timestamp with untimestamped entries first.
    ///
    /// Returns the number of entries removed.
    #[instrument(skip(self), fields(count, removed))]
    pub async fn cleanup_old_entries(&self) -> Result<u64> {
        let db = self.database().await?;
        let mut tx = db.pool().begin().await.or_raise(|| ErrorKind::Database)?;
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_partition.sql"))
            .bind(Partition::Book.as_str())
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let ratio = self.options.eviction_ratio.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let evict = (count as f64 * ratio).floor() as i64;
        tracing::Span::current().record("count", count);
        if evict == 0 {
            return Ok(0);
        }
        let result = sqlx::query(include_str!("../queries/delete_oldest.sql"))
            .bind(Partition::Book.as_str())
            .bind(Partition::Book.as_str())
            .bind(evict)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::Span::current().record("removed", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Remove every entry in `partition`, or everything when `None`.
    #[instrument(skip(self))]
    pub async fn clear(&self, partition: Option<Partition>) -> Result<u64> {
        let db = self.database().await?;
        let query = match partition {
            Some(partition) => sqlx::query(include_str!("../queries/clear_partition.sql")).bind(partition.as_str()),
            None => sqlx::query(include_str!("../queries/clear_all.sql")),
        };
        let result = query.execute(db.pool()).await.or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self, partition: Partition) -> Result<u64> {
        let db = self.database().await?;
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_partition.sql"))
            .bind(partition.as_str())
            .fetch_one(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("entry count"))
    }

    /// Entries in `partition`, oldest first.
    pub async fn list(&self, partition: Partition) -> Result<Vec<EntryInfo>> {
        let db = self.database().await?;
        let rows: Vec<EntryRow> = sqlx::query_as(include_str!("../queries/list_entries.sql"))
            .bind(partition.as_str())
            .fetch_all(db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(|row| row.into_info(self.options.bytes_per_char)).collect()
    }

    /// Close the database if it was ever opened.
    pub async fn close(&self) {
        if let Some(db) = self.db.get() {
            db.close().await;
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).or_raise(|| ErrorKind::InvalidData("payload"))
}
