//! Data source module - Abstraction for fetching Sui objects and transactions
//!
//! The decoders never touch the network. Everything they read comes through
//! a [`DataSource`], which serves RPC-shaped objects and transaction pages.
//! Retries and timeouts belong to the implementation, not to the callers.

use crate::{Config, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub mod cache;
pub mod file;
pub mod history;
pub mod models;

// Re-export models
pub use cache::{CachedDataSource, DataSourceCache};
pub use file::FileDataSource;
pub use models::{
    Argument, Command, ExecutionStatus, MoveCall, ObjectChange, ObjectChangeKind, ObjectInput,
    ObjectSnapshot, Page, ProgrammableTransaction, PureInput, TxBlock, TxData, TxEffects, TxInput,
    TxKind, TxResponse,
};

/// Transaction query filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TxFilter {
    /// Transactions taking the object as an input
    InputObject(String),
    /// Transactions that created, mutated or deleted the object
    ChangedObject(String),
}

impl TxFilter {
    pub fn object_id(&self) -> &str {
        match self {
            TxFilter::InputObject(id) | TxFilter::ChangedObject(id) => id,
        }
    }
}

/// Data source trait for fetching Sui chain data
///
/// Implementations:
/// - `FileDataSource`: saved RPC responses on disk
/// - `CachedDataSource`: TTL disk cache in front of another source
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch object snapshots; unknown ids are left out of the result
    async fn get_objects(&self, ids: &[String]) -> Result<Vec<ObjectSnapshot>>;

    /// Fetch one page of transactions matching `filter`
    async fn query_transactions(
        &self,
        filter: &TxFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<TxResponse>>;
}

/// Create a data source from the configuration
pub async fn create_data_source(
    config: &Config,
    dump_dir: Option<PathBuf>,
    cache_enabled: bool,
) -> Result<Box<dyn DataSource>> {
    let dir = dump_dir.unwrap_or_else(|| config.dump_dir());
    let source = FileDataSource::open(&dir).await?;

    if cache_enabled {
        let cache = DataSourceCache::new(config.cache.ttl, Some(config.cache_directory()));
        Ok(Box::new(CachedDataSource::new(source, cache)))
    } else {
        Ok(Box::new(source))
    }
}
