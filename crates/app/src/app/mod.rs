use std::path::Path;
use std::sync::Arc;

use dashboard_db::Db;
use ingest::{HttpUsageSource, UsageSource};

use crate::config::DashboardConfig;
use crate::error::{AppError, Result};
use crate::services::AppServices;
use crate::store::{SqliteUsageStore, UsageStore};

/// Application state shared by the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub services: AppServices,
}

impl AppState {
    /// Wires the real upstream client and SQLite store.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let source = HttpUsageSource::new(config.upstream_timeout)
            .map_err(|err| AppError::Message(format!("build upstream client: {err}")))?;
        let store = SqliteUsageStore::new(config.db_path.clone());
        Ok(Self::with_parts(config, Arc::new(source), Arc::new(store)))
    }

    pub fn with_parts(
        config: DashboardConfig,
        source: Arc<dyn UsageSource>,
        store: Arc<dyn UsageStore>,
    ) -> Self {
        let config = Arc::new(config);
        let services = AppServices::new(config.clone(), source, store);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|err| AppError::Message(format!("create {}: {err}", parent.display())))?;
    }
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
