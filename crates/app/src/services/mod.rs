mod analytics;
mod session;
mod sync;

use std::sync::Arc;

use ingest::UsageSource;

use crate::auth::AuthGuard;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::store::UsageStore;
use dashboard_db::Db;

pub use analytics::{AnalyticsService, RecordsQuery};
pub use session::SessionService;
pub use sync::{InsertSummary, SyncError, SyncReport, SyncService};

pub(crate) type SharedConfig = Arc<DashboardConfig>;

/// Service registry shared by every request handler.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthGuard,
    pub analytics: AnalyticsService,
    pub session: SessionService,
    pub sync: SyncService,
}

impl AppServices {
    pub fn new(
        config: SharedConfig,
        source: Arc<dyn UsageSource>,
        store: Arc<dyn UsageStore>,
    ) -> Self {
        let auth = AuthGuard::from_config(&config);
        Self {
            analytics: AnalyticsService::new(config.clone()),
            session: SessionService::new(config.clone(), auth.clone()),
            sync: SyncService::new(config, auth.clone(), source, store),
            auth,
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
