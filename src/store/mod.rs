//! Submission storage
//!
//! The handler only needs a single-item upsert keyed by partition and sort
//! key. Writing to the same key twice replaces the earlier item.

mod file;
mod memory;

use std::future::Future;

use anyhow::Context;
use serde_json::{Map, Value};

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::forms::record::StorageKey;

pub type Item = Map<String, Value>;

/// Key-value put collaborator
pub trait SubmissionStore {
    /// Upsert `item` under `key` in `table`.
    ///
    /// `table` is `None` when no table name was configured; implementations
    /// must fail the call rather than guess.
    fn put(
        &self,
        table: Option<&str>,
        key: &StorageKey,
        item: Item,
    ) -> impl Future<Output = anyhow::Result<()>>;
}

/// Store selected by configuration
#[derive(Debug)]
pub enum AnyStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl AnyStore {
    pub fn from_config(config: &StorageConfig) -> Self {
        match config.backend {
            StorageBackend::File => Self::File(FileStore::new(&config.data_dir)),
            StorageBackend::Memory => Self::Memory(MemoryStore::default()),
        }
    }
}

impl SubmissionStore for AnyStore {
    async fn put(&self, table: Option<&str>, key: &StorageKey, item: Item) -> anyhow::Result<()> {
        match self {
            Self::File(store) => store.put(table, key, item).await,
            Self::Memory(store) => store.put(table, key, item).await,
        }
    }
}

/// Table name or an error naming the missing setting
fn require_table(table: Option<&str>) -> anyhow::Result<&str> {
    table
        .filter(|t| !t.is_empty())
        .context("storage table name is not configured")
}
