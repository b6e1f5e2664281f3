use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use dashboard_app::{AppState, DashboardConfig, hash_password};
use tower::util::ServiceExt;

use crate::HttpState;

fn router(dir: &tempfile::TempDir) -> axum::Router {
    let config = DashboardConfig {
        db_path: dir.path().join("dashboard.sqlite"),
        ..DashboardConfig::default()
    };
    let app_state = AppState::new(config).expect("app state");
    app_state.setup_db().expect("setup db");
    crate::router(HttpState::new(app_state))
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let response = router(&temp_dir)
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn logout_with(cookie: Option<String>) -> String {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let mut builder = Request::builder().method("POST").uri("/api/auth/logout");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let response = router(&temp_dir)
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn logout_expires_cookie() {
    let cookie = logout_with(None).await;
    assert!(cookie.starts_with("dashboard_auth=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_expires_an_existing_session() {
    let session = format!("dashboard_auth={}", hash_password("hunter2"));
    let cookie = logout_with(Some(session)).await;
    assert!(cookie.starts_with("dashboard_auth=;"));
    assert!(cookie.contains("Max-Age=0"));
}
