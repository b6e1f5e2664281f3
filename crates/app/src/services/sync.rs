use std::sync::Arc;

use chrono::Utc;
use dashboard_db::InsertOutcome;
use ingest::{FetchError, UsageSource};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::auth::{AuthGuard, Credentials};
use crate::services::SharedConfig;
use crate::store::UsageStore;

/// Why a sync run stopped. Each variant maps to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("PASSWORD is missing")]
    MissingPassword,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Config(String),
    #[error("Failed to fetch usage")]
    FetchFailed { status: u16, status_text: String },
    #[error("Failed to fetch usage")]
    Unreachable(String),
    #[error("Failed to parse usage response")]
    ParseFailed(String),
    #[error("Database insert failed")]
    Database(String),
}

impl SyncError {
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingPassword | Self::Config(_) => 501,
            Self::Unauthorized => 401,
            Self::FetchFailed { status, .. } => *status,
            Self::Unreachable(_) | Self::ParseFailed(_) => 502,
            Self::Database(_) => 500,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unreachable(detail) | Self::ParseFailed(detail) | Self::Database(detail) => {
                Some(detail.as_str())
            }
            _ => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            Self::FetchFailed { status_text, .. } => Some(status_text.as_str()),
            _ => None,
        }
    }
}

/// Store acknowledgement echoed back for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    pub attempted: usize,
    pub rows_affected: usize,
    pub skipped: usize,
}

impl From<InsertOutcome> for InsertSummary {
    fn from(outcome: InsertOutcome) -> Self {
        Self {
            attempted: outcome.attempted,
            rows_affected: outcome.rows_affected,
            skipped: outcome.skipped(),
        }
    }
}

/// Successful sync result. `inserted` counts rows submitted to the store,
/// including ones it skipped as duplicates; `db` has the real split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub status: &'static str,
    pub inserted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<InsertSummary>,
}

impl SyncReport {
    fn empty() -> Self {
        Self {
            status: "ok",
            inserted: 0,
            message: Some("No usage data".to_string()),
            db: None,
        }
    }
}

/// Pulls usage from the proxy and appends it to the store.
#[derive(Clone)]
pub struct SyncService {
    config: SharedConfig,
    guard: AuthGuard,
    source: Arc<dyn UsageSource>,
    store: Arc<dyn UsageStore>,
}

impl SyncService {
    pub fn new(
        config: SharedConfig,
        guard: AuthGuard,
        source: Arc<dyn UsageSource>,
        store: Arc<dyn UsageStore>,
    ) -> Self {
        Self {
            config,
            guard,
            source,
            store,
        }
    }

    pub async fn run(&self, credentials: &Credentials) -> Result<SyncReport, SyncError> {
        if !self.config.has_auth_secret() {
            warn!("sync rejected: no password or cron secret configured");
            return Err(SyncError::MissingPassword);
        }
        let Some(strategy) = self.guard.accepted_by(credentials) else {
            warn!("sync rejected: unauthorized");
            return Err(SyncError::Unauthorized);
        };
        let target = self.config.assert_upstream().map_err(|err| {
            warn!(error = %err, "sync rejected: upstream not configured");
            SyncError::Config(err.to_string())
        })?;

        let pulled_at = Utc::now();
        let body = self
            .source
            .fetch_usage(&target)
            .await
            .map_err(|err| match err {
                FetchError::Status {
                    status,
                    status_text,
                } => {
                    warn!(status, %status_text, "upstream usage request failed");
                    SyncError::FetchFailed {
                        status,
                        status_text,
                    }
                }
                FetchError::Transport(err) => {
                    warn!(error = %err, "upstream usage request did not complete");
                    SyncError::Unreachable(err.to_string())
                }
                FetchError::Body(detail) => {
                    warn!(error = %detail, "upstream usage body could not be read");
                    SyncError::ParseFailed(detail)
                }
            })?;

        let payload = ingest::parse_usage_payload(&body).map_err(|err| {
            warn!(error = %err, "upstream usage payload rejected");
            SyncError::ParseFailed(err.to_string())
        })?;
        let rows = ingest::to_usage_records(&payload, pulled_at);
        if rows.is_empty() {
            info!(strategy, "sync found no usage data");
            return Ok(SyncReport::empty());
        }

        let submitted = rows.len();
        let outcome = self
            .store
            .insert_usage_records(rows)
            .await
            .map_err(|err| {
                error!(error = %err, "usage insert failed");
                SyncError::Database(err.to_string())
            })?;
        info!(
            strategy,
            submitted,
            rows_affected = outcome.rows_affected,
            skipped = outcome.skipped(),
            "sync complete"
        );
        Ok(SyncReport {
            status: "ok",
            inserted: submitted,
            message: None,
            db: Some(outcome.into()),
        })
    }
}
