//! JSON file store
//!
//! Each table is one JSON document under the data directory, shaped as
//! `{ "<pk>": { "<sk>": item } }`. Writes are serialized and replace the
//! document atomically through a temporary file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;

use super::{require_table, Item, SubmissionStore};
use crate::forms::record::StorageKey;

#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn table_path(&self, table: &str) -> anyhow::Result<PathBuf> {
        let safe = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !table.starts_with('.');
        anyhow::ensure!(safe, "invalid table name '{table}'");
        Ok(self.data_dir.join(format!("{table}.json")))
    }

    /// Read a whole table document; a missing file is an empty table
    pub async fn load_table(&self, table: &str) -> anyhow::Result<Map<String, Value>> {
        let path = self.table_path(table)?;
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt table file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

impl SubmissionStore for FileStore {
    async fn put(&self, table: Option<&str>, key: &StorageKey, item: Item) -> anyhow::Result<()> {
        let table = require_table(table)?;
        let path = self.table_path(table)?;
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load_table(table).await?;
        let partition = doc
            .entry(key.pk.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(partition) = partition else {
            anyhow::bail!("partition '{}' in {} is not an object", key.pk, path.display());
        };
        partition.insert(key.sk.clone(), Value::Object(item));

        fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}
