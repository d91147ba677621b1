//! In-process store, used for local runs and tests

use std::collections::HashMap;
use std::sync::Mutex;

use super::{require_table, Item, SubmissionStore};
use crate::forms::record::StorageKey;

type Tables = HashMap<String, HashMap<StorageKey, Item>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    puts: Mutex<usize>,
}

impl MemoryStore {
    /// Stored item, if any
    pub fn get(&self, table: &str, key: &StorageKey) -> Option<Item> {
        let tables = self.tables.lock().ok()?;
        tables.get(table)?.get(key).cloned()
    }

    /// Number of items in `table`
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(table).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Number of successful `put` calls since creation
    pub fn put_count(&self) -> usize {
        self.puts.lock().map_or(0, |n| *n)
    }
}

impl SubmissionStore for MemoryStore {
    async fn put(&self, table: Option<&str>, key: &StorageKey, item: Item) -> anyhow::Result<()> {
        let table = require_table(table)?;
        {
            let mut tables = self
                .tables
                .lock()
                .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
            tables
                .entry(table.to_string())
                .or_default()
                .insert(key.clone(), item);
        }
        if let Ok(mut puts) = self.puts.lock() {
            *puts += 1;
        }
        Ok(())
    }
}
