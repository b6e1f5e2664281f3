mod support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashboard_app::{AppState, Credentials, SyncError, hash_password};
use ingest::HttpUsageSource;
use support::{
    CRON_SECRET, FailingStore, FakeSource, ONE_ROW, PASSWORD, build_app, full_config,
};

fn bearer(token: &str) -> Credentials {
    Credentials {
        authorization: Some(format!("Bearer {token}")),
        session_cookie: None,
    }
}

#[tokio::test]
async fn repeated_sync_stores_one_row() {
    let source = FakeSource::body(ONE_ROW);
    let app = build_app(|_| {}, source.clone());
    let sync = &app.state.services.sync;

    let first = sync.run(&bearer(CRON_SECRET)).await.expect("first sync");
    assert_eq!(first.status, "ok");
    assert_eq!(first.inserted, 1);
    let db = first.db.expect("db summary");
    assert_eq!(db.rows_affected, 1);

    let second = sync.run(&bearer(CRON_SECRET)).await.expect("second sync");
    assert_eq!(second.inserted, 1);
    let db = second.db.expect("db summary");
    assert_eq!(db.rows_affected, 0);
    assert_eq!(db.skipped, 1);

    let stored = app
        .state
        .open_db()
        .expect("open db")
        .count_usage_records()
        .expect("count");
    assert_eq!(stored, 1);
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn session_cookie_authorizes_sync() {
    let app = build_app(|_| {}, FakeSource::body(ONE_ROW));
    let credentials = Credentials {
        authorization: None,
        session_cookie: Some(hash_password(PASSWORD)),
    };
    let report = app
        .state
        .services
        .sync
        .run(&credentials)
        .await
        .expect("sync");
    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
    let source = FakeSource::body(ONE_ROW);
    let app = build_app(|_| {}, source.clone());
    let sync = &app.state.services.sync;

    for credentials in [
        Credentials::default(),
        bearer("wrong"),
        Credentials {
            authorization: None,
            session_cookie: Some(PASSWORD.to_string()),
        },
    ] {
        let err = sync.run(&credentials).await.expect_err("unauthorized");
        assert!(matches!(err, SyncError::Unauthorized));
        assert_eq!(err.status(), 401);
    }
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn no_secrets_is_not_implemented_even_with_credentials() {
    let source = FakeSource::body(ONE_ROW);
    let app = build_app(
        |config| {
            config.password = None;
            config.cron_secret = None;
        },
        source.clone(),
    );

    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("missing password");
    assert!(matches!(err, SyncError::MissingPassword));
    assert_eq!(err.status(), 501);
    assert_eq!(err.to_string(), "PASSWORD is missing");
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn missing_upstream_settings_are_reported_after_auth() {
    let app = build_app(
        |config| config.upstream_base_url = None,
        FakeSource::body(ONE_ROW),
    );
    let sync = &app.state.services.sync;

    let err = sync.run(&Credentials::default()).await.expect_err("401");
    assert_eq!(err.status(), 401);

    let err = sync.run(&bearer(CRON_SECRET)).await.expect_err("501");
    assert_eq!(err.status(), 501);
    assert_eq!(err.to_string(), "CLIPROXY_API_BASE_URL is missing");
}

#[tokio::test]
async fn upstream_status_is_mirrored() {
    let app = build_app(|_| {}, FakeSource::status(503, "Service Unavailable"));
    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("fetch failed");
    assert_eq!(err.status(), 503);
    assert_eq!(err.status_text(), Some("Service Unavailable"));
    assert_eq!(err.to_string(), "Failed to fetch usage");
}

#[tokio::test]
async fn invalid_payload_is_bad_gateway_without_store_call() {
    let app = build_app(|_| {}, FakeSource::body(r#"{"usage": [{"route": "/chat"}]}"#));
    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("parse failed");
    assert_eq!(err.status(), 502);
    assert!(err.detail().expect("detail").contains("usage entry #0"));
    assert_eq!(app.store.call_count(), 0);

    let app = build_app(|_| {}, FakeSource::body("not json"));
    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("parse failed");
    assert!(matches!(err, SyncError::ParseFailed(_)));
}

#[tokio::test]
async fn oversized_token_counts_are_rejected_before_storage() {
    let app = build_app(
        |_| {},
        FakeSource::body(
            r#"{"usage": [
                {"route": "/chat", "model": "gpt-x", "occurredAt": "2024-01-01T00:00:00Z", "tokens": 18446744073709551615},
                {"route": "/chat", "model": "gpt-x", "occurredAt": "2024-01-01T00:01:00Z", "tokens": 5}
            ]}"#,
        ),
    );
    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("counter out of range");
    assert!(matches!(err, SyncError::ParseFailed(_)));
    assert_eq!(err.status(), 502);
    assert_eq!(app.store.call_count(), 0);
    let stored = app
        .state
        .open_db()
        .expect("open db")
        .count_usage_records()
        .expect("count");
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn unreadable_body_is_a_parse_failure() {
    let app = build_app(|_| {}, FakeSource::broken_body("connection reset mid-body"));
    let err = app
        .state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("body read failed");
    assert!(matches!(err, SyncError::ParseFailed(_)));
    assert_eq!(err.status(), 502);
    assert_eq!(err.to_string(), "Failed to parse usage response");
    assert_eq!(err.detail(), Some("connection reset mid-body"));
    assert_eq!(app.store.call_count(), 0);
}

#[tokio::test]
async fn empty_payload_short_circuits() {
    let app = build_app(|_| {}, FakeSource::body(r#"{"usage": []}"#));
    let report = app
        .state
        .services
        .sync
        .run(&bearer(PASSWORD))
        .await
        .expect("sync");
    assert_eq!(report.status, "ok");
    assert_eq!(report.inserted, 0);
    assert_eq!(report.message.as_deref(), Some("No usage data"));
    assert!(report.db.is_none());
    assert_eq!(app.store.call_count(), 0);
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = AppState::with_parts(
        full_config(&dir),
        FakeSource::body(ONE_ROW),
        Arc::new(FailingStore),
    );
    let err = state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("db failure");
    assert_eq!(err.status(), 500);
    assert_eq!(err.to_string(), "Database insert failed");
    assert_eq!(err.detail(), Some("disk full"));
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = full_config(&dir);
    config.upstream_base_url = Some(format!("http://{addr}"));
    let source = HttpUsageSource::new(Duration::from_secs(2)).expect("client");
    let state = AppState::with_parts(config, Arc::new(source), Arc::new(FailingStore));

    let err = state
        .services
        .sync
        .run(&bearer(CRON_SECRET))
        .await
        .expect_err("unreachable");
    assert!(matches!(err, SyncError::Unreachable(_)));
    assert_eq!(err.status(), 502);
}
