//! Caching component
//!
//! Disk cache for object snapshots and transaction pages. Entries expire
//! after a TTL measured from the file's modification time, since shared
//! auction objects keep changing on-chain.

use super::{DataSource, ObjectSnapshot, Page, TxFilter, TxResponse};
use crate::Result;
use crate::parser::normalize_address;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

/// Data Source Cache
#[derive(Debug, Clone)]
pub struct DataSourceCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl DataSourceCache {
    /// Create a new cache instance
    pub fn new(ttl: Duration, cache_dir: Option<PathBuf>) -> Self {
        let cache_dir = cache_dir.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sui-auction")
        });

        Self { cache_dir, ttl }
    }

    /// Key of an object entry; short and long forms of an id share it
    pub fn object_key(id: &str) -> String {
        format!("obj_{}", sanitize(&normalize_address(id)))
    }

    pub fn page_key(filter: &TxFilter, cursor: Option<&str>, limit: usize) -> String {
        let (kind, id) = match filter {
            TxFilter::InputObject(id) => ("input", id),
            TxFilter::ChangedObject(id) => ("changed", id),
        };
        format!(
            "txs_{}_{}_{}_{}",
            kind,
            sanitize(id),
            sanitize(cursor.unwrap_or("start")),
            limit
        )
    }

    /// Get cache file path
    fn get_cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Check if cache is valid
    async fn is_cache_valid(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path).await else {
            return false;
        };

        metadata
            .modified()
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|elapsed| elapsed < self.ttl)
    }

    /// Ensure cache directory exists
    async fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(crate::Error::Io)?;
        }
        Ok(())
    }

    /// Read a cached value; expired or unreadable entries count as misses
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.get_cache_path(key);
        if !self.is_cache_valid(&path).await {
            return None;
        }

        match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => {
                    tracing::debug!("Cache hit for key {}", key);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!("Failed to deserialize cached entry {}: {}", key, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read cached entry {}: {}", key, e);
                None
            }
        }
    }

    /// Write a value to the cache; failures are logged and ignored
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.ensure_cache_dir().await {
            tracing::warn!("Failed to create cache directory: {}", e);
            return;
        }

        let path = self.get_cache_path(key);
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json).await {
                    tracing::warn!("Failed to write cache entry {}: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Any data source with a disk cache in front of it
#[derive(Debug, Clone)]
pub struct CachedDataSource<D> {
    inner: D,
    cache: DataSourceCache,
}

impl<D: DataSource> CachedDataSource<D> {
    pub fn new(inner: D, cache: DataSourceCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<D: DataSource> DataSource for CachedDataSource<D> {
    async fn get_objects(&self, ids: &[String]) -> Result<Vec<ObjectSnapshot>> {
        let mut cached = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match self.cache.get::<ObjectSnapshot>(&DataSourceCache::object_key(id)).await {
                Some(snapshot) => cached.push((id.clone(), snapshot)),
                None => missing.push(id.clone()),
            }
        }

        let fetched = if missing.is_empty() {
            Vec::new()
        } else {
            tracing::debug!("Fetching {} uncached objects", missing.len());
            self.inner.get_objects(&missing).await?
        };
        for snapshot in &fetched {
            self.cache
                .save(&DataSourceCache::object_key(&snapshot.object_id), snapshot)
                .await;
        }

        // Keep the requested order
        let mut found: Vec<(String, ObjectSnapshot)> = cached
            .into_iter()
            .map(|(id, s)| (normalize_address(&id), s))
            .collect();
        found.extend(
            fetched
                .into_iter()
                .map(|s| (normalize_address(&s.object_id), s)),
        );
        Ok(ids
            .iter()
            .filter_map(|id| {
                let wanted = normalize_address(id);
                found
                    .iter()
                    .position(|(key, _)| *key == wanted)
                    .map(|i| found.swap_remove(i).1)
            })
            .collect())
    }

    async fn query_transactions(
        &self,
        filter: &TxFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<TxResponse>> {
        let key = DataSourceCache::page_key(filter, cursor, limit);
        if let Some(page) = self.cache.get::<Page<TxResponse>>(&key).await {
            tracing::info!(?cursor, %limit, "Cache hit for transaction page");
            return Ok(page);
        }

        let page = self.inner.query_transactions(filter, cursor, limit).await?;
        self.cache.save(&key, &page).await;
        Ok(page)
    }
}
