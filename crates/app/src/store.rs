use std::path::PathBuf;

use async_trait::async_trait;
use dashboard_core::UsageRecord;
use dashboard_db::{Db, InsertOutcome};

use crate::error::{AppError, Result};

/// Destination for normalized usage rows.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Inserts `records`, skipping any whose natural key is already stored.
    async fn insert_usage_records(&self, records: Vec<UsageRecord>) -> Result<InsertOutcome>;
}

/// SQLite-backed store. Each call opens its own connection on the blocking
/// pool.
#[derive(Clone, Debug)]
pub struct SqliteUsageStore {
    db_path: PathBuf,
}

impl SqliteUsageStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

#[async_trait]
impl UsageStore for SqliteUsageStore {
    async fn insert_usage_records(&self, records: Vec<UsageRecord>) -> Result<InsertOutcome> {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> Result<InsertOutcome> {
            let mut db = Db::open(&path)?;
            Ok(db.insert_usage_records(&records)?)
        })
        .await
        .map_err(|err| AppError::Message(format!("insert task failed: {err}")))?
    }
}
