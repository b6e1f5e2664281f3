#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashboard_app::{AppError, AppState, DashboardConfig, SqliteUsageStore, UsageStore};
use dashboard_core::UsageRecord;
use dashboard_db::InsertOutcome;
use ingest::{FetchError, UpstreamTarget, UsageSource};
use tempfile::TempDir;

pub const PASSWORD: &str = "hunter2";
pub const CRON_SECRET: &str = "cron-secret";

pub const ONE_ROW: &str = r#"{"usage": [{"route": "/chat", "model": "gpt-x", "occurredAt": "2024-01-01T00:00:00Z", "tokens": 10}]}"#;

pub enum FakeResponse {
    Body(String),
    Status(u16, &'static str),
    BrokenBody(&'static str),
}

/// Upstream stand-in that replays one canned response.
pub struct FakeSource {
    response: FakeResponse,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn body(body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: FakeResponse::Body(body.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn status(status: u16, status_text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: FakeResponse::Status(status, status_text),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn broken_body(detail: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: FakeResponse::BrokenBody(detail),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageSource for FakeSource {
    async fn fetch_usage(&self, _target: &UpstreamTarget) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            FakeResponse::Body(body) => Ok(body.clone().into_bytes()),
            FakeResponse::Status(status, status_text) => Err(FetchError::Status {
                status: *status,
                status_text: status_text.to_string(),
            }),
            FakeResponse::BrokenBody(detail) => Err(FetchError::Body(detail.to_string())),
        }
    }
}

/// SQLite store that also counts how often it was asked to write.
pub struct CountingStore {
    inner: SqliteUsageStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageStore for CountingStore {
    async fn insert_usage_records(
        &self,
        records: Vec<UsageRecord>,
    ) -> dashboard_app::Result<InsertOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_usage_records(records).await
    }
}

pub struct FailingStore;

#[async_trait]
impl UsageStore for FailingStore {
    async fn insert_usage_records(
        &self,
        _records: Vec<UsageRecord>,
    ) -> dashboard_app::Result<InsertOutcome> {
        Err(AppError::Message("disk full".to_string()))
    }
}

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub store: Arc<CountingStore>,
}

pub fn full_config(dir: &TempDir) -> DashboardConfig {
    DashboardConfig {
        password: Some(PASSWORD.to_string()),
        cron_secret: Some(CRON_SECRET.to_string()),
        upstream_base_url: Some("http://proxy.invalid".to_string()),
        upstream_api_key: Some("upstream-key".to_string()),
        db_path: dir.path().join("dashboard.sqlite"),
        ..DashboardConfig::default()
    }
}

pub fn build_app(
    configure: impl FnOnce(&mut DashboardConfig),
    source: Arc<dyn UsageSource>,
) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = full_config(&dir);
    configure(&mut config);
    let store = Arc::new(CountingStore {
        inner: SqliteUsageStore::new(config.db_path.clone()),
        calls: AtomicUsize::new(0),
    });
    let state = AppState::with_parts(config, source, store.clone());
    state.setup_db().expect("setup db");
    TestApp {
        _dir: dir,
        state,
        store,
    }
}
