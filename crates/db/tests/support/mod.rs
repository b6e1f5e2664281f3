#![allow(dead_code)]

use std::path::PathBuf;

use dashboard_core::{TimeRange, UsageRecord, UsageTokens};
use dashboard_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_record(occurred_at: &str, route: &str, model: &str, total_tokens: u64) -> UsageRecord {
    UsageRecord {
        occurred_at: occurred_at.to_string(),
        route: route.to_string(),
        model: model.to_string(),
        tokens: UsageTokens {
            input_tokens: total_tokens / 2,
            output_tokens: total_tokens - total_tokens / 2,
            reasoning_tokens: 0,
            cached_tokens: 0,
            total_tokens,
        },
        failed: false,
        pulled_at: "2025-01-02T00:00:00.000Z".to_string(),
        raw_json: None,
    }
}

pub fn day_range() -> TimeRange {
    TimeRange {
        start: "2025-01-01T00:00:00.000Z".to_string(),
        end: "2025-01-02T00:00:00.000Z".to_string(),
    }
}
